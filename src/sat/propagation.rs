#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Unit propagation over an arena of clauses.
//!
//! Committing a literal `u` rewrites the current clause list:
//! - a clause containing `u` is satisfied and dropped;
//! - a clause containing `¬u` loses every occurrence of `¬u` (resolution). The
//!   shortened copy is pushed onto the arena and moves to the end of the list. An
//!   empty result is kept as a conflict marker;
//! - any other clause is left alone and keeps its relative position.
//!
//! When a clause mentions both `u` and `¬u`, whichever occurs first decides.
//! Clause order matters: the solver branches on the first unit clause, or on the
//! first literal of the first clause, so this reordering is part of its behaviour.

use crate::sat::assignment::Model;
use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use crate::sat::trail::ClauseRef;

/// Commits `unit` to `model` and returns the simplified clause list.
///
/// Shortened clauses are appended to `arena`; the clauses `formula` refers to are
/// never modified, so a caller holding an older clause list can still use it after
/// truncating the arena back to its previous length.
pub fn propagate<L: Literal>(
    arena: &mut Vec<Clause<L>>,
    model: &mut Model<L>,
    formula: &[ClauseRef],
    unit: L,
) -> Vec<ClauseRef> {
    model.insert(unit);
    let complement = unit.negated();

    let mut kept = Vec::with_capacity(formula.len());
    let mut shortened = Vec::new();

    for &id in formula {
        let clause = &arena[id];
        match clause
            .iter()
            .copied()
            .find(|&lit| lit == unit || lit == complement)
        {
            None => kept.push(id),
            Some(lit) if lit == unit => {}
            Some(_) => shortened.push(
                clause
                    .iter()
                    .copied()
                    .filter(|&lit| lit != complement)
                    .collect::<Clause<L>>(),
            ),
        }
    }

    for clause in shortened {
        kept.push(arena.len());
        arena.push(clause);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::PackedLiteral;

    fn lit(value: i32) -> PackedLiteral {
        PackedLiteral::from(value)
    }

    fn arena(clauses: &[&[i32]]) -> Vec<Clause<PackedLiteral>> {
        clauses.iter().map(|c| Clause::new(c.to_vec())).collect()
    }

    fn render(arena: &[Clause<PackedLiteral>], formula: &[ClauseRef]) -> Vec<Vec<i32>> {
        formula
            .iter()
            .map(|&id| arena[id].iter().map(|l| l.to_i32()).collect())
            .collect()
    }

    #[test]
    fn test_satisfied_clauses_are_dropped() {
        let mut clauses = arena(&[&[1, 2], &[3], &[1]]);
        let mut model = Model::new();
        let formula = propagate(&mut clauses, &mut model, &[0, 1, 2], lit(1));

        assert_eq!(render(&clauses, &formula), vec![vec![3]]);
        assert!(model.contains(lit(1)));
    }

    #[test]
    fn test_resolved_clauses_move_to_the_end() {
        let mut clauses = arena(&[&[-1, 2], &[3, 4], &[5, -1, 6], &[7]]);
        let mut model = Model::new();
        let formula = propagate(&mut clauses, &mut model, &[0, 1, 2, 3], lit(1));

        assert_eq!(
            render(&clauses, &formula),
            vec![vec![3, 4], vec![7], vec![2], vec![5, 6]]
        );
        // originals untouched
        assert_eq!(clauses[0], Clause::new(vec![-1, 2]));
        assert_eq!(clauses.len(), 6);
    }

    #[test]
    fn test_resolution_can_produce_the_empty_clause() {
        let mut clauses = arena(&[&[-1]]);
        let mut model = Model::new();
        let formula = propagate(&mut clauses, &mut model, &[0], lit(1));

        assert_eq!(formula.len(), 1);
        assert!(clauses[formula[0]].is_empty());
    }

    #[test]
    fn test_first_occurrence_decides_for_tautologies() {
        let mut clauses = arena(&[&[1, -1], &[-1, 2, 1, -1]]);
        let mut model = Model::new();
        let formula = propagate(&mut clauses, &mut model, &[0, 1], lit(1));

        assert_eq!(render(&clauses, &formula), vec![vec![2, 1]]);
    }
}
