//! Defines the Davis-Putnam / DPLL satisfiability solver.
//!
//! The search follows a fixed discipline so that the same clause order always
//! yields the same model:
//!
//! 1.  **Base cases:** an empty clause list is satisfied by the model built so far;
//!     otherwise, any empty clause means the current branch is contradictory.
//! 2.  **Selection:** the literal of the first unit clause is *forced*. Without a
//!     unit clause, the first literal of the first clause is a free choice.
//! 3.  **Branching:** a forced literal is committed as is, with no alternative. A
//!     free choice tries its variable's positive phase first and, if that branch
//!     fails, the negative phase.
//! 4.  **Propagation:** committing a literal drops satisfied clauses and shortens
//!     clauses containing its complement (see `crate::sat::propagation`).
//!
//! Each commitment removes at least one literal occurrence from the clause list and
//! none are ever introduced, so the search terminates. Its depth is bounded by the
//! number of literal occurrences in the input, which is why the search runs on an
//! explicit stack of choice points instead of the call stack.

use crate::sat::assignment::Model;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, PackedLiteral};
use crate::sat::propagation::propagate;
use crate::sat::solver::{SolutionStats, Solver};
use crate::sat::trail::{ChoicePoint, ClauseRef, Trail};
use tracing::{debug, trace};

/// What the search should do at the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node<L: Literal> {
    Satisfied,
    Conflict,
    /// The literal of the first unit clause.
    Forced(L),
    /// First literal of the first clause; both phases may have to be tried.
    Undetermined(L),
}

/// A DPLL solver over a fixed formula.
///
/// Clauses produced by resolution live in an arena after the input clauses. A
/// node of the search is a list of arena indices; backtracking truncates the arena
/// and the model back to the lengths recorded on the trail.
#[derive(Debug, Clone)]
pub struct Dpll<L: Literal = PackedLiteral> {
    pub cnf: Cnf<L>,
    arena: Vec<Clause<L>>,
    model: Model<L>,
    /// Length of the caller-supplied part of `model`.
    seeded: usize,
    trail: Trail<L>,
    stats: SolutionStats,
}

impl<L: Literal> Solver<L> for Dpll<L> {
    fn new(cnf: Cnf<L>) -> Self {
        Self::with_model(cnf, Model::new())
    }

    fn solve(&mut self) -> Option<Model<L>> {
        self.reset();
        let mut formula: Vec<ClauseRef> = (0..self.cnf.len()).collect();

        loop {
            match self.examine(&formula) {
                Node::Satisfied => {
                    debug!(
                        decisions = self.stats.decisions,
                        conflicts = self.stats.conflicts,
                        model = self.model.len(),
                        "formula satisfied"
                    );
                    return Some(self.model.clone());
                }
                Node::Conflict => {
                    self.stats.conflicts += 1;
                    if let Some(next) = self.backtrack() {
                        formula = next;
                    } else {
                        debug!(
                            decisions = self.stats.decisions,
                            conflicts = self.stats.conflicts,
                            "formula unsatisfiable"
                        );
                        return None;
                    }
                }
                Node::Forced(lit) => {
                    trace!(literal = ?lit, "forced");
                    self.stats.propagations += 1;
                    formula = propagate(&mut self.arena, &mut self.model, &formula, lit);
                }
                Node::Undetermined(lit) => {
                    self.stats.decisions += 1;
                    self.stats.propagations += 1;
                    trace!(literal = ?lit.positive(), depth = self.trail.depth(), "decision");
                    let model_len = self.model.len();
                    let arena_len = self.arena.len();
                    let next = propagate(&mut self.arena, &mut self.model, &formula, lit.positive());
                    self.trail.push(ChoicePoint {
                        formula,
                        alternative: lit.negative(),
                        model_len,
                        arena_len,
                    });
                    formula = next;
                }
            }
        }
    }

    fn stats(&self) -> SolutionStats {
        SolutionStats {
            max_depth: self.trail.max_depth(),
            ..self.stats
        }
    }
}

impl<L: Literal> Dpll<L> {
    /// A solver whose model starts out holding `model`.
    ///
    /// The seeded literals are returned as part of any model found but do not
    /// simplify the formula.
    #[must_use]
    pub fn with_model(cnf: Cnf<L>, model: Model<L>) -> Self {
        let arena = cnf.clauses.clone();
        let seeded = model.len();
        Self {
            cnf,
            arena,
            model,
            seeded,
            trail: Trail::new(),
            stats: SolutionStats::default(),
        }
    }

    fn reset(&mut self) {
        self.arena.truncate(self.cnf.len());
        self.model.truncate(self.seeded);
        self.trail.clear();
        self.stats = SolutionStats::default();
    }

    fn examine(&self, formula: &[ClauseRef]) -> Node<L> {
        let Some(&first) = formula.first() else {
            return Node::Satisfied;
        };
        if formula.iter().any(|&id| self.arena[id].is_empty()) {
            return Node::Conflict;
        }
        if let Some(&unit) = formula.iter().find(|&&id| self.arena[id].is_unit()) {
            return Node::Forced(self.arena[unit][0]);
        }
        Node::Undetermined(self.arena[first][0])
    }

    /// Resumes the newest open choice point with its other phase.
    fn backtrack(&mut self) -> Option<Vec<ClauseRef>> {
        let point = self.trail.pop()?;
        self.model.truncate(point.model_len);
        self.arena.truncate(point.arena_len);
        trace!(literal = ?point.alternative, depth = self.trail.depth(), "backtrack");
        self.stats.propagations += 1;
        Some(propagate(
            &mut self.arena,
            &mut self.model,
            &point.formula,
            point.alternative,
        ))
    }
}

/// Solves `cnf` with a fresh [`Dpll`] solver.
#[must_use]
pub fn solve<L: Literal>(cnf: Cnf<L>) -> Option<Model<L>> {
    Dpll::new(cnf).solve()
}
