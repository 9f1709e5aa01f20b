//! This crate solves classical planning problems by reduction to Boolean satisfiability.

/// The `planning` module encodes grounded planning problems into CNF and reads plans
/// back out of satisfying models.
pub mod planning;

/// The `sat` module implements the DPLL solver, which determines the satisfiability of
/// Boolean formulas.
pub mod sat;
