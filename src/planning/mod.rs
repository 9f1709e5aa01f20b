#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Planning as satisfiability.
//!
//! A grounded problem is encoded for a fixed horizon ([`encoder`]), the formula is
//! handed to the DPLL solver, and a model, if any, is read back as a sequential
//! plan ([`plan`]).

pub mod encoder;
pub mod grounded;
pub mod plan;
pub mod problem;
pub mod symbols;

use crate::planning::encoder::{encode_with, EncoderOptions, Encoding};
use crate::planning::plan::Plan;
use crate::planning::problem::PlanningProblem;
use crate::sat::assignment::Model;
use crate::sat::dpll::Dpll;
use crate::sat::literal::PackedLiteral;
use crate::sat::solver::{SolutionStats, Solver};
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::info;

/// The outcome of encoding and solving at one horizon.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub encoding: Encoding,
    pub model: Option<Model<PackedLiteral>>,
    pub stats: SolutionStats,
    pub elapsed: Duration,
}

impl Attempt {
    #[must_use]
    pub const fn horizon(&self) -> usize {
        self.encoding.horizon
    }

    #[must_use]
    pub const fn is_satisfiable(&self) -> bool {
        self.model.is_some()
    }

    /// The plan read off the model, if the formula was satisfiable.
    #[must_use]
    pub fn plan(&self) -> Option<Plan> {
        self.model.as_ref().map(|model| self.encoding.plan(model))
    }
}

/// Encodes `problem` at `horizon` and solves the result.
#[must_use]
pub fn attempt<P: PlanningProblem>(
    problem: &P,
    horizon: usize,
    options: &EncoderOptions,
) -> Attempt {
    let encoding = encode_with(problem, horizon, options);

    let time = std::time::Instant::now();
    let mut solver = Dpll::new(encoding.cnf.clone());
    let model = solver.solve();
    let elapsed = time.elapsed();

    info!(
        horizon,
        satisfiable = model.is_some(),
        elapsed = ?elapsed,
        "solved planning formula"
    );

    Attempt {
        encoding,
        model,
        stats: solver.stats(),
        elapsed,
    }
}

/// Tries each horizon in turn and returns the first satisfiable attempt, so the
/// plan found is a shortest one within the range.
#[must_use]
pub fn search<P: PlanningProblem>(
    problem: &P,
    horizons: RangeInclusive<usize>,
    options: &EncoderOptions,
) -> Option<Attempt> {
    horizons
        .map(|horizon| attempt(problem, horizon, options))
        .find(Attempt::is_satisfiable)
}

/// A plan of at most `horizon` steps, if one exists.
#[must_use]
pub fn find_plan<P: PlanningProblem>(problem: &P, horizon: usize) -> Option<Plan> {
    attempt(problem, horizon, &EncoderOptions::default()).plan()
}
