//! Formulas in conjunctive normal form.
//!
//! A `Cnf` is an ordered list of clauses read as their conjunction. Order has no
//! logical meaning but the solver branches in clause order, so it decides which
//! model is found when several exist.

use crate::sat::assignment::Model;
use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, PackedLiteral, Variable};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf<L: Literal = PackedLiteral> {
    pub clauses: Vec<Clause<L>>,
    /// Largest variable index mentioned, plus one.
    pub num_vars: usize,
}

impl<L: Literal> Cnf<L> {
    pub fn new<J, I>(clauses: J) -> Self
    where
        J: IntoIterator<Item = I>,
        I: IntoIterator<Item = i32>,
    {
        clauses
            .into_iter()
            .map(|clause| clause.into_iter().map(L::from_i32).collect::<Clause<L>>())
            .collect()
    }

    /// Appends a clause, widening `num_vars` if needed.
    pub fn add_clause(&mut self, clause: Clause<L>) {
        if let Some(max) = clause.iter().map(|lit| lit.variable()).max() {
            self.num_vars = self.num_vars.max(max as usize + 1);
        }
        self.clauses.push(clause);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause<L>> {
        self.clauses.iter()
    }

    /// Total number of literal occurrences across all clauses.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    /// Distinct variables, in first-occurrence order.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.clauses
            .iter()
            .flat_map(Clause::iter)
            .map(|lit| lit.variable())
            .unique()
            .collect()
    }

    /// `true` if every clause has at least one literal in `model`.
    #[must_use]
    pub fn verify(&self, model: &Model<L>) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.is_satisfied_by(|lit| model.contains(lit)))
    }
}

impl<L: Literal> FromIterator<Clause<L>> for Cnf<L> {
    fn from_iter<T: IntoIterator<Item = Clause<L>>>(iter: T) -> Self {
        let mut cnf = Self {
            clauses: Vec::new(),
            num_vars: 0,
        };
        for clause in iter {
            cnf.add_clause(clause);
        }
        cnf
    }
}

impl<L: Literal> From<Vec<Vec<i32>>> for Cnf<L> {
    fn from(clauses: Vec<Vec<i32>>) -> Self {
        Self::new(clauses)
    }
}

/// DIMACS rendering: a `p cnf` header followed by one zero-terminated line per clause.
impl<L: Literal> Display for Cnf<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "p cnf {} {}",
            self.num_vars.saturating_sub(1),
            self.clauses.len()
        )?;
        for clause in &self.clauses {
            for lit in clause.iter() {
                write!(f, "{} ", lit.to_i32())?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counts_variables() {
        let cnf: Cnf = Cnf::new(vec![vec![1, -2], vec![3]]);
        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.num_vars, 4);
        assert_eq!(cnf.num_literals(), 3);
        assert_eq!(cnf.variables(), vec![1, 2, 3]);
    }

    #[test]
    fn test_verify() {
        let cnf: Cnf = Cnf::new(vec![vec![1, -2], vec![2, 3]]);
        let good: Model<PackedLiteral> = [1, 2].into_iter().map(PackedLiteral::from).collect();
        let bad: Model<PackedLiteral> = [-1, 2, -3].into_iter().map(PackedLiteral::from).collect();
        assert!(cnf.verify(&good));
        assert!(!cnf.verify(&bad));
    }

    #[test]
    fn test_verify_fails_on_empty_clause() {
        let cnf: Cnf = Cnf::new(vec![Vec::<i32>::new()]);
        assert!(!cnf.verify(&Model::new()));
        assert!(Cnf::<PackedLiteral>::default().verify(&Model::new()));
    }

    #[test]
    fn test_display_dimacs() {
        let cnf: Cnf = Cnf::new(vec![vec![1, -2], vec![2]]);
        assert_eq!(cnf.to_string(), "p cnf 2 2\n1 -2 0\n2 0\n");
    }
}
