//! Grounded planning problems.
//!
//! Grounding (turning a lifted domain and a problem instance into concrete fluents
//! and actions) happens elsewhere; the encoder only needs the ground result, exposed
//! through the [`PlanningProblem`] trait.

use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};

/// A ground proposition, e.g. `(at rob loc1)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    pub predicate: String,
    pub args: Vec<String>,
}

impl Atom {
    pub fn new<S: Into<String>>(predicate: impl Into<String>, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            predicate: predicate.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses `(pred a b)` or `pred a b`. Returns `None` for empty or unbalanced input.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let inner = match (text.strip_prefix('('), text.strip_suffix(')')) {
            (Some(_), Some(_)) => &text[1..text.len() - 1],
            (None, None) => text,
            _ => return None,
        };
        let mut words = inner.split_whitespace();
        let predicate = words.next()?;
        if predicate.contains(['(', ')']) {
            return None;
        }
        Some(Self::new(predicate, words))
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.predicate)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, ")")
    }
}

/// A fully instantiated action.
///
/// The four atom lists behave as sets: the `with_*` builders ignore duplicates,
/// but keep insertion order because it fixes the order of the emitted clauses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Action {
    pub name: String,
    pub args: Vec<String>,
    pub precondition_pos: Vec<Atom>,
    pub precondition_neg: Vec<Atom>,
    pub effect_pos: Vec<Atom>,
    pub effect_neg: Vec<Atom>,
}

pub(crate) fn insert_unique(atoms: &mut Vec<Atom>, atom: Atom) {
    if !atoms.contains(&atom) {
        atoms.push(atom);
    }
}

impl Action {
    pub fn new<S: Into<String>>(name: impl Into<String>, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_precondition(mut self, atom: Atom) -> Self {
        insert_unique(&mut self.precondition_pos, atom);
        self
    }

    #[must_use]
    pub fn with_negative_precondition(mut self, atom: Atom) -> Self {
        insert_unique(&mut self.precondition_neg, atom);
        self
    }

    #[must_use]
    pub fn with_add_effect(mut self, atom: Atom) -> Self {
        insert_unique(&mut self.effect_pos, atom);
        self
    }

    #[must_use]
    pub fn with_delete_effect(mut self, atom: Atom) -> Self {
        insert_unique(&mut self.effect_neg, atom);
        self
    }

    /// An action is trivial when everything it adds is already required to hold.
    /// Such an action can never make progress, so the encoder leaves it out.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.effect_pos
            .iter()
            .all(|effect| self.precondition_pos.contains(effect))
    }

    #[must_use]
    pub fn adds(&self, atom: &Atom) -> bool {
        self.effect_pos.contains(atom)
    }

    #[must_use]
    pub fn deletes(&self, atom: &Atom) -> bool {
        self.effect_neg.contains(atom)
    }

    /// `true` if this action has the given name and arguments.
    #[must_use]
    pub fn is(&self, name: &str, args: &[String]) -> bool {
        self.name == name && self.args == args
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.args.join(", "))
    }
}

/// Predicates that some non-trivial action adds or deletes.
///
/// Any other predicate is a static background relation: its atoms never change,
/// so preconditions over it are assumed to hold at every step.
#[must_use]
pub fn changing_predicates(actions: &[Action]) -> FxHashSet<&str> {
    actions
        .iter()
        .filter(|action| !action.is_trivial())
        .flat_map(|action| action.effect_pos.iter().chain(&action.effect_neg))
        .map(|atom| atom.predicate.as_str())
        .collect()
}

/// What the encoder needs from a grounded problem.
///
/// All collections are ordered; the encoder emits clauses in that order.
pub trait PlanningProblem {
    /// Atoms true in the initial state. Fluents not listed are false.
    fn initial_state(&self) -> &[Atom];

    /// Atoms that must hold after the last step.
    fn goal_state(&self) -> &[Atom];

    /// Every ground fluent whose value may change over time.
    fn fluents(&self) -> &[Atom];

    fn actions(&self) -> &[Action];

    /// Looks up a ground action by name and arguments.
    fn action(&self, name: &str, args: &[String]) -> Option<&Action> {
        self.actions().iter().find(|action| action.is(name, args))
    }
}

/// An in-memory grounded problem.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Problem {
    pub initial_state: Vec<Atom>,
    pub goal_state: Vec<Atom>,
    pub fluents: Vec<Atom>,
    pub actions: Vec<Action>,
}

impl Problem {
    #[must_use]
    pub fn new(
        initial_state: Vec<Atom>,
        goal_state: Vec<Atom>,
        fluents: Vec<Atom>,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            initial_state,
            goal_state,
            fluents,
            actions,
        }
    }

    /// The atoms whose value can change over time, for problem descriptions that
    /// do not list their fluents.
    ///
    /// Effect atoms come first, in first-occurrence order. They are followed by the
    /// precondition (positive, then negative) and goal atoms over a changing
    /// predicate that no action adds or deletes: those must still be fluents, or
    /// their value at step 0 would be left open. Atoms of static predicates are
    /// background facts, not fluents.
    #[must_use]
    pub fn derive_fluents(actions: &[Action], goals: &[Atom]) -> Vec<Atom> {
        let mut fluents = Vec::new();
        for action in actions {
            for atom in action.effect_pos.iter().chain(&action.effect_neg) {
                insert_unique(&mut fluents, atom.clone());
            }
        }

        let changing = changing_predicates(actions);
        let mentioned = actions
            .iter()
            .flat_map(|action| action.precondition_pos.iter().chain(&action.precondition_neg))
            .chain(goals)
            .filter(|atom| changing.contains(atom.predicate.as_str()));
        for atom in mentioned {
            insert_unique(&mut fluents, atom.clone());
        }
        fluents
    }
}

impl PlanningProblem for Problem {
    fn initial_state(&self) -> &[Atom] {
        &self.initial_state
    }

    fn goal_state(&self) -> &[Atom] {
        &self.goal_state
    }

    fn fluents(&self) -> &[Atom] {
        &self.fluents
    }

    fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(robot: &str, loc: &str) -> Atom {
        Atom::new("at", [robot, loc])
    }

    #[test]
    fn test_atom_display_and_parse() {
        let atom = at("rob", "loc1");
        assert_eq!(atom.to_string(), "(at rob loc1)");
        assert_eq!(Atom::parse("(at rob loc1)"), Some(atom.clone()));
        assert_eq!(Atom::parse("  at  rob loc1 "), Some(atom));
        assert_eq!(Atom::parse("(handempty)"), Some(Atom::new("handempty", Vec::<String>::new())));
        assert_eq!(Atom::parse("(at rob"), None);
        assert_eq!(Atom::parse("()"), None);
    }

    #[test]
    fn test_builders_ignore_duplicates() {
        let action = Action::new("move", ["rob", "loc1", "loc2"])
            .with_precondition(at("rob", "loc1"))
            .with_precondition(at("rob", "loc1"))
            .with_add_effect(at("rob", "loc2"))
            .with_delete_effect(at("rob", "loc1"));

        assert_eq!(action.precondition_pos.len(), 1);
        assert!(action.adds(&at("rob", "loc2")));
        assert!(action.deletes(&at("rob", "loc1")));
        assert_eq!(action.to_string(), "move(rob, loc1, loc2)");
    }

    #[test]
    fn test_trivial_actions() {
        let noop = Action::new("wait", ["rob"])
            .with_precondition(at("rob", "loc1"))
            .with_add_effect(at("rob", "loc1"));
        assert!(noop.is_trivial());

        let no_effects = Action::new("look", ["rob"]);
        assert!(no_effects.is_trivial());

        let mover = Action::new("move", ["rob"])
            .with_precondition(at("rob", "loc1"))
            .with_add_effect(at("rob", "loc2"));
        assert!(!mover.is_trivial());
    }

    #[test]
    fn test_changing_predicates_ignore_trivial_actions() {
        let actions = vec![
            Action::new("move", ["rob"])
                .with_precondition(Atom::new("adjacent", ["loc1", "loc2"]))
                .with_add_effect(at("rob", "loc2")),
            Action::new("paint", ["loc1"])
                .with_precondition(Atom::new("painted", ["loc1"]))
                .with_add_effect(Atom::new("painted", ["loc1"])),
        ];
        let changing = changing_predicates(&actions);
        assert!(changing.contains("at"));
        assert!(!changing.contains("adjacent"));
        assert!(!changing.contains("painted"));
    }

    #[test]
    fn test_derive_fluents() {
        let actions = vec![
            Action::new("move", ["rob", "loc1", "loc2"])
                .with_precondition(Atom::new("adjacent", ["loc1", "loc2"]))
                .with_add_effect(at("rob", "loc2"))
                .with_delete_effect(at("rob", "loc1")),
            Action::new("move", ["rob", "loc2", "loc1"])
                .with_add_effect(at("rob", "loc1"))
                .with_delete_effect(at("rob", "loc2")),
        ];
        assert_eq!(
            Problem::derive_fluents(&actions, &[at("rob", "loc1")]),
            vec![at("rob", "loc2"), at("rob", "loc1")]
        );
    }

    #[test]
    fn test_derive_fluents_includes_unreachable_conditions() {
        let done = Atom::new("done", Vec::<String>::new());
        let actions = vec![
            Action::new("finish", ["x"])
                .with_precondition(Atom::new("holding", ["x"]))
                .with_precondition(Atom::new("adjacent", ["x", "y"]))
                .with_negative_precondition(Atom::new("holding", ["z"]))
                .with_add_effect(done.clone()),
            Action::new("grab", ["y"]).with_add_effect(Atom::new("holding", ["y"])),
        ];
        let goals = [done.clone(), Atom::new("holding", ["w"]), Atom::new("sunny", Vec::<String>::new())];

        assert_eq!(
            Problem::derive_fluents(&actions, &goals),
            vec![
                done,
                Atom::new("holding", ["y"]),
                Atom::new("holding", ["x"]),
                Atom::new("holding", ["z"]),
                Atom::new("holding", ["w"]),
            ]
        );
    }

    #[test]
    fn test_action_lookup() {
        let problem = Problem::new(
            vec![at("rob", "loc1")],
            vec![at("rob", "loc2")],
            vec![at("rob", "loc1"), at("rob", "loc2")],
            vec![Action::new("move", ["rob", "loc1", "loc2"]).with_add_effect(at("rob", "loc2"))],
        );
        let args = ["rob", "loc1", "loc2"].map(String::from);
        assert!(problem.action("move", &args).is_some());
        assert!(problem.action("move", &args[..2]).is_none());
        assert!(problem.action("jump", &args).is_none());
    }
}
