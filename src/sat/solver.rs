use crate::sat::assignment::Model;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, PackedLiteral};

/// Counters collected during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolutionStats {
    /// Free choices, i.e. branches on a literal that no unit clause forced.
    pub decisions: usize,
    /// Literals committed to the model, forced or chosen.
    pub propagations: usize,
    /// Times the search met an empty clause and had to backtrack.
    pub conflicts: usize,
    /// Deepest stack of open choice points.
    pub max_depth: usize,
}

pub trait Solver<L: Literal = PackedLiteral> {
    fn new(cnf: Cnf<L>) -> Self;

    /// Decides the formula. `Some` carries a model under which every clause has a
    /// true literal; `None` means unsatisfiable.
    fn solve(&mut self) -> Option<Model<L>>;

    fn stats(&self) -> SolutionStats;
}
