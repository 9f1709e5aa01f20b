//! A small line-oriented format for already grounded problems.
//!
//! ```text
//! # one robot, two rooms
//! fluent (at rob loc1)
//! fluent (at rob loc2)
//! init   (at rob loc1)
//! init   (adjacent loc1 loc2)
//! goal   (at rob loc2)
//!
//! action move rob loc1 loc2
//! pre    (at rob loc1)
//! pre    (adjacent loc1 loc2)
//! add    (at rob loc2)
//! del    (at rob loc1)
//! ```
//!
//! `pre`, `pre-not`, `add` and `del` attach to the most recent `action`. Blank
//! lines and text after `#` are ignored. When the file has no `fluent` lines,
//! the fluents are derived from the actions and goals (see
//! [`Problem::derive_fluents`]).

use crate::planning::problem::{insert_unique, Action, Atom, Problem};
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroundedError {
    #[error("failed to read problem: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: unknown directive '{directive}'")]
    UnknownDirective { line: usize, directive: String },

    #[error("line {line}: '{directive}' must follow an action")]
    OutsideAction { line: usize, directive: String },

    #[error("line {line}: '{directive}' needs an argument")]
    MissingArgument { line: usize, directive: String },

    #[error("line {line}: malformed atom '{text}'")]
    MalformedAtom { line: usize, text: String },
}

/// Parses a grounded problem from `reader`.
///
/// # Errors
///
/// Fails on I/O errors and on the first malformed line.
pub fn parse_grounded<R: BufRead>(reader: R) -> Result<Problem, GroundedError> {
    let mut problem = Problem::default();
    let mut fluents_listed = false;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let number = number + 1;
        let content = line.split_once('#').map_or(line.as_str(), |(before, _)| before).trim();
        if content.is_empty() {
            continue;
        }

        let (directive, rest) = content
            .split_once(char::is_whitespace)
            .map_or((content, ""), |(d, r)| (d, r.trim()));

        if rest.is_empty() {
            return Err(GroundedError::MissingArgument {
                line: number,
                directive: directive.to_string(),
            });
        }

        let atom = || {
            Atom::parse(rest).ok_or_else(|| GroundedError::MalformedAtom {
                line: number,
                text: rest.to_string(),
            })
        };

        match directive {
            "fluent" => {
                fluents_listed = true;
                insert_unique(&mut problem.fluents, atom()?);
            }
            "init" => insert_unique(&mut problem.initial_state, atom()?),
            "goal" => insert_unique(&mut problem.goal_state, atom()?),
            "action" => {
                let mut words = rest.split_whitespace();
                let name = words.next().unwrap_or_default();
                problem.actions.push(Action::new(name, words));
            }
            "pre" | "pre-not" | "add" | "del" => {
                let atom = atom()?;
                let Some(action) = problem.actions.pop() else {
                    return Err(GroundedError::OutsideAction {
                        line: number,
                        directive: directive.to_string(),
                    });
                };
                let action = match directive {
                    "pre" => action.with_precondition(atom),
                    "pre-not" => action.with_negative_precondition(atom),
                    "add" => action.with_add_effect(atom),
                    _ => action.with_delete_effect(atom),
                };
                problem.actions.push(action);
            }
            _ => {
                return Err(GroundedError::UnknownDirective {
                    line: number,
                    directive: directive.to_string(),
                });
            }
        }
    }

    if !fluents_listed {
        problem.fluents = Problem::derive_fluents(&problem.actions, &problem.goal_state);
    }
    Ok(problem)
}

/// Parses a grounded problem held in a string.
///
/// # Errors
///
/// See [`parse_grounded`].
pub fn parse_str(text: &str) -> Result<Problem, GroundedError> {
    parse_grounded(text.as_bytes())
}

/// Opens and parses the grounded problem at `path`.
///
/// # Errors
///
/// See [`parse_grounded`]; also fails if the file cannot be opened.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Problem, GroundedError> {
    let file = std::fs::File::open(path)?;
    parse_grounded(io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROBOT: &str = "\
# one robot, two rooms
fluent (at rob loc1)
fluent (at rob loc2)
init (at rob loc1)
init (adjacent loc1 loc2)
init (adjacent loc2 loc1)
goal (at rob loc2)

action move rob loc1 loc2
pre (at rob loc1)
pre (adjacent loc1 loc2)
add (at rob loc2)
del (at rob loc1)

action move rob loc2 loc1   # the way back
pre (at rob loc2)
pre (adjacent loc2 loc1)
add (at rob loc1)
del (at rob loc2)
";

    #[test]
    fn test_parse_robot() {
        let problem = parse_str(ROBOT).unwrap();

        assert_eq!(problem.fluents.len(), 2);
        assert_eq!(problem.initial_state.len(), 3);
        assert_eq!(problem.goal_state, vec![Atom::new("at", ["rob", "loc2"])]);
        assert_eq!(problem.actions.len(), 2);

        let back = &problem.actions[1];
        assert_eq!(back.to_string(), "move(rob, loc2, loc1)");
        assert_eq!(back.precondition_pos.len(), 2);
        assert!(back.adds(&Atom::new("at", ["rob", "loc1"])));
        assert!(back.deletes(&Atom::new("at", ["rob", "loc2"])));
    }

    #[test]
    fn test_fluents_default_to_effect_atoms() {
        let text = "init (on a)\naction flip a\nadd (off a)\ndel (on a)\n";
        let problem = parse_str(text).unwrap();
        assert_eq!(
            problem.fluents,
            vec![Atom::new("off", ["a"]), Atom::new("on", ["a"])]
        );
    }

    #[test]
    fn test_fluents_default_covers_conditions_nothing_adds() {
        let text = "\
goal (done)
action finish x
pre (holding x)
add (done)
action grab y
add (holding y)
";
        let problem = parse_str(text).unwrap();
        assert_eq!(
            problem.fluents,
            vec![
                Atom::new("done", Vec::<String>::new()),
                Atom::new("holding", ["y"]),
                Atom::new("holding", ["x"]),
            ]
        );

        // `(holding x)` starts false and nothing adds it, so `finish x` never fires.
        let options = crate::planning::encoder::EncoderOptions::default();
        assert!(crate::planning::search(&problem, 0..=3, &options).is_none());
    }

    #[test]
    fn test_negative_precondition() {
        let problem = parse_str("action go\npre-not (blocked)\nadd (gone)\n").unwrap();
        assert_eq!(
            problem.actions[0].precondition_neg,
            vec![Atom::new("blocked", Vec::<String>::new())]
        );
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert!(matches!(
            parse_str("init (a)\nbogus (b)\n"),
            Err(GroundedError::UnknownDirective { line: 2, .. })
        ));
        assert!(matches!(
            parse_str("add (a)\n"),
            Err(GroundedError::OutsideAction { line: 1, .. })
        ));
        assert!(matches!(
            parse_str("\n\ngoal\n"),
            Err(GroundedError::MissingArgument { line: 3, .. })
        ));
        assert!(matches!(
            parse_str("goal (at rob\n"),
            Err(GroundedError::MalformedAtom { line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_file("/nonexistent/problem.plan"),
            Err(GroundedError::Io(_))
        ));
    }
}
