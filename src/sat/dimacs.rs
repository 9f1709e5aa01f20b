#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A reader for the DIMACS CNF format.
//!
//! - Comment lines start with `c`.
//! - The problem line `p cnf <variables> <clauses>` is skipped; counts are derived
//!   from the clauses actually read.
//! - All other lines form one stream of whitespace-separated integers. Each `0`
//!   closes a clause, so a line may hold several clauses and a clause may span
//!   several lines. A final clause with no closing `0` is kept.
//! - A `%` line ends the data (some benchmark sets append trailing garbage).
//!
//! A `0` that closes nothing is an empty clause and is kept: it makes the formula
//! unsatisfiable.

use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("failed to read DIMACS input: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: failed to parse literal '{token}' as i32")]
    Literal { line: usize, token: String },

    #[error("line {line}: literal {value} is out of range")]
    OutOfRange { line: usize, value: i32 },
}

/// Parses DIMACS data from `reader`.
///
/// # Errors
///
/// Returns an error if reading fails, a token is not an integer, or a literal
/// names a variable that does not fit in 31 bits (`i32::MIN`).
pub fn parse_dimacs<R: BufRead, L: Literal>(reader: R) -> Result<Cnf<L>, DimacsError> {
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut current: Vec<i32> = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace().peekable();

        match tokens.peek() {
            Some(&"%") => break,
            None | Some(&"c" | &"p") => continue,
            Some(_) => {}
        }

        for token in tokens {
            let value = token.parse::<i32>().map_err(|_| DimacsError::Literal {
                line: number + 1,
                token: token.to_string(),
            })?;
            match value {
                0 => clauses.push(std::mem::take(&mut current)),
                i32::MIN => {
                    return Err(DimacsError::OutOfRange {
                        line: number + 1,
                        value,
                    });
                }
                _ => current.push(value),
            }
        }
    }

    if !current.is_empty() {
        clauses.push(current);
    }

    Ok(Cnf::new(clauses))
}

/// Opens and parses the DIMACS file at `path`.
///
/// # Errors
///
/// See [`parse_dimacs`]; also fails if the file cannot be opened.
pub fn parse_file<L: Literal>(path: impl AsRef<Path>) -> Result<Cnf<L>, DimacsError> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::PackedLiteral;
    use std::io::Cursor;

    type TestCnf = Cnf<PackedLiteral>;

    #[test]
    fn test_parse_simple_dimacs() {
        let dimacs_content = "c This is a comment\n\
                              p cnf 3 2\n\
                              1 -2 0\n\
                              2 3 0\n";
        let cnf: TestCnf = parse_dimacs(Cursor::new(dimacs_content)).unwrap();

        assert_eq!(cnf.clauses.len(), 2, "Should parse 2 clauses");
        assert_eq!(cnf.num_vars, 3 + 1, "Number of variables mismatch");

        let c1_lits: Vec<i32> = cnf.clauses[0].iter().map(|l| l.to_i32()).collect();
        assert_eq!(c1_lits, vec![1, -2]);
        let c2_lits: Vec<i32> = cnf.clauses[1].iter().map(|l| l.to_i32()).collect();
        assert_eq!(c2_lits, vec![2, 3]);
    }

    #[test]
    fn test_parse_dimacs_with_empty_lines_and_end_marker() {
        let dimacs_content = "p cnf 2 2\n\
                              \n\
                              1 0\n\
                              \n\
                              -2 0\n\
                              %\n\
                              c this should be ignored";
        let cnf: TestCnf = parse_dimacs(Cursor::new(dimacs_content)).unwrap();

        assert_eq!(cnf.clauses.len(), 2);
        assert_eq!(cnf.num_vars, 2 + 1);
        assert_eq!(cnf.clauses[0][0].to_i32(), 1);
        assert_eq!(cnf.clauses[1][0].to_i32(), -2);
    }

    #[test]
    fn test_parse_dimacs_keeps_empty_clause() {
        let cnf: TestCnf = parse_dimacs(Cursor::new("p cnf 1 1\n0\n")).unwrap();
        assert_eq!(cnf.clauses.len(), 1);
        assert!(cnf.clauses[0].is_empty());
    }

    #[test]
    fn test_parse_dimacs_malformed_literal() {
        let err = parse_dimacs::<_, PackedLiteral>(Cursor::new("1 0\n1 abc 0\n")).unwrap_err();
        assert!(matches!(err, DimacsError::Literal { line: 2, ref token } if token == "abc"));
    }

    #[test]
    fn test_parse_dimacs_no_clauses() {
        let cnf: TestCnf = parse_dimacs(Cursor::new("p cnf 0 0\n")).unwrap();
        assert!(cnf.clauses.is_empty());
        assert_eq!(cnf.num_vars, 0);
    }

    #[test]
    fn test_several_clauses_on_one_line() {
        let cnf: TestCnf = parse_dimacs(Cursor::new("p cnf 1 2\n1 0 -1 0\n")).unwrap();
        assert_eq!(cnf, Cnf::new(vec![vec![1], vec![-1]]));
        assert_eq!(crate::sat::dpll::solve(cnf), None);
    }

    #[test]
    fn test_clause_spanning_lines() {
        let cnf: TestCnf = parse_dimacs(Cursor::new("p cnf 3 3\n1 2\n3 0\n-1 0\n-2 0\n")).unwrap();
        assert_eq!(cnf, Cnf::new(vec![vec![1, 2, 3], vec![-1], vec![-2]]));

        let model = crate::sat::dpll::solve(cnf.clone()).expect("3 is free to be true");
        assert!(cnf.verify(&model));
        assert_eq!(model.to_dimacs(), vec![-1, -2, 3]);
    }

    #[test]
    fn test_trailing_clause_without_terminator() {
        let cnf: TestCnf = parse_dimacs(Cursor::new("1 -2 0\n2 3")).unwrap();
        assert_eq!(cnf, Cnf::new(vec![vec![1, -2], vec![2, 3]]));

        let cnf: TestCnf = parse_dimacs(Cursor::new("1 -2 0\n2 3\n%\n4 0\n")).unwrap();
        assert_eq!(cnf, Cnf::new(vec![vec![1, -2], vec![2, 3]]));
    }

    #[test]
    fn test_parse_dimacs_rejects_min_literal() {
        let err = parse_dimacs::<_, PackedLiteral>(Cursor::new("1 0\n-2147483648 1 0\n"))
            .unwrap_err();
        assert!(matches!(err, DimacsError::OutOfRange { line: 2, value: i32::MIN }));
    }

    #[test]
    fn test_round_trips_through_display() {
        let cnf: TestCnf = Cnf::new(vec![vec![1, -3], vec![2]]);
        let parsed: TestCnf = parse_dimacs(Cursor::new(cnf.to_string())).unwrap();
        assert_eq!(parsed, cnf);
    }
}
