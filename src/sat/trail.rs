#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Undo log for the DPLL search.
//!
//! Every free choice pushes a `ChoicePoint` holding what is needed to try the other
//! phase later: the clause list the choice was made on, and how long the model and
//! the clause arena were at that moment. Backtracking pops the newest point and
//! truncates back to those lengths, so sibling branches never see each other's
//! commitments.

use crate::sat::literal::Literal;

/// Index of a clause in the solver's clause arena.
pub type ClauseRef = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePoint<L: Literal> {
    /// The clause list at the node where the choice was made.
    pub formula: Vec<ClauseRef>,
    /// Phase still to be tried.
    pub alternative: L,
    pub model_len: usize,
    pub arena_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trail<L: Literal> {
    points: Vec<ChoicePoint<L>>,
    max_depth: usize,
}

impl<L: Literal> Default for Trail<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Literal> Trail<L> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            max_depth: 0,
        }
    }

    pub fn push(&mut self, point: ChoicePoint<L>) {
        self.points.push(point);
        self.max_depth = self.max_depth.max(self.points.len());
    }

    /// Removes the newest open choice point.
    pub fn pop(&mut self) -> Option<ChoicePoint<L>> {
        self.points.pop()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.max_depth = 0;
    }
}
