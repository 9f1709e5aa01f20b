//! Encodes a grounded planning problem of fixed horizon into CNF.
//!
//! Every fluent and every action gets one variable per time step. A model of the
//! resulting formula describes a sequence of states `0..=horizon` and, for each
//! step `t < horizon`, at most one action firing between state `t` and `t + 1`.
//! A step where no action fires leaves the state unchanged, so a model can hold a
//! plan shorter than the horizon.
//!
//! Clauses are emitted family by family:
//!
//! 1.  **Initial state:** a unit clause per fluent at step 0, positive if the fluent
//!     is initially true.
//! 2.  **Goal:** a positive unit clause per goal atom at the horizon.
//! 3.  **Actions:** an action implies its preconditions at `t` and its effects at
//!     `t + 1`.
//! 4.  **Explanatory frame axioms:** a fluent only changes value if some action
//!     that makes that change fires.
//! 5.  **Complete exclusion:** no two actions fire at the same step.
//!
//! Families 3 to 5 are emitted for every step before the next family starts.
//! Trivial actions (see [`Action::is_trivial`]) take part in none of them.

use crate::planning::plan::{extract_plan, Plan};
use crate::planning::problem::{changing_predicates, Action, Atom, PlanningProblem};
use crate::planning::symbols::{PlanLiteral, SymbolTable};
use crate::sat::assignment::Model;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::PackedLiteral;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::fmt::Write;
use tracing::debug;

/// Knobs for [`encode_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderOptions {
    /// Also emit `¬a@t ∨ ¬p@t` for each negative precondition `p`.
    ///
    /// A negative precondition over a static predicate is decided by the initial
    /// state instead: if the atom holds there, the action gets the unit `¬a@t`.
    pub negative_preconditions: bool,
}

impl EncoderOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            negative_preconditions: false,
        }
    }

    #[must_use]
    pub const fn with_negative_preconditions(mut self, enabled: bool) -> Self {
        self.negative_preconditions = enabled;
        self
    }
}

/// Number of clauses emitted per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FamilyCounts {
    pub initial: usize,
    pub goal: usize,
    pub action: usize,
    pub frame: usize,
    pub exclusion: usize,
}

impl FamilyCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.initial + self.goal + self.action + self.frame + self.exclusion
    }
}

/// The formula for one horizon, with the table needed to read its models.
#[derive(Debug, Clone)]
pub struct Encoding {
    pub cnf: Cnf,
    pub symbols: SymbolTable,
    pub horizon: usize,
    pub counts: FamilyCounts,
}

impl Encoding {
    /// The clause at `index` as planning literals.
    #[must_use]
    pub fn clause(&self, index: usize) -> Option<Vec<PlanLiteral>> {
        let clause = self.cnf.clauses.get(index)?;
        clause.iter().map(|&lit| self.symbols.decode(lit)).collect()
    }

    /// The literals of `model` as planning literals, in commit order.
    #[must_use]
    pub fn decode(&self, model: &Model<PackedLiteral>) -> Vec<PlanLiteral> {
        self.symbols.decode_model(model)
    }

    #[must_use]
    pub fn plan(&self, model: &Model<PackedLiteral>) -> Plan {
        extract_plan(self.decode(model))
    }

    /// DIMACS text of the formula, preceded by one `c <var> <proposition>`
    /// comment per variable.
    #[must_use]
    pub fn to_dimacs(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "c planning formula, horizon {}", self.horizon);
        for (var, proposition) in self.symbols.iter() {
            let _ = writeln!(out, "c {var} {proposition}");
        }
        out.push_str(&self.cnf.to_string());
        out
    }
}

/// Encodes `problem` for plans of at most `horizon` steps with default options.
#[must_use]
pub fn encode<P: PlanningProblem>(problem: &P, horizon: usize) -> Encoding {
    encode_with(problem, horizon, &EncoderOptions::default())
}

#[must_use]
pub fn encode_with<P: PlanningProblem>(
    problem: &P,
    horizon: usize,
    options: &EncoderOptions,
) -> Encoding {
    let mut encoder = Encoder::new(problem, options);

    encoder.counts.initial = encoder.initial_state();
    encoder.counts.goal = encoder.goal_state(horizon);
    for step in 0..horizon {
        encoder.counts.action += encoder.actions(step);
    }
    for step in 0..horizon {
        encoder.counts.frame += encoder.frame_axioms(step);
    }
    for step in 0..horizon {
        encoder.counts.exclusion += encoder.exclusion_axioms(step);
    }

    let Encoder {
        mut cnf,
        symbols,
        counts,
        ..
    } = encoder;
    cnf.num_vars = cnf.num_vars.max(symbols.len() + 1);

    debug!(
        horizon,
        variables = symbols.len(),
        clauses = cnf.len(),
        initial = counts.initial,
        goal = counts.goal,
        action = counts.action,
        frame = counts.frame,
        exclusion = counts.exclusion,
        "encoded planning problem"
    );

    Encoding {
        cnf,
        symbols,
        horizon,
        counts,
    }
}

struct Encoder<'a, P: PlanningProblem> {
    problem: &'a P,
    options: &'a EncoderOptions,
    /// Non-trivial actions with their index in `problem.actions()`.
    relevant: Vec<(usize, &'a Action)>,
    changing: FxHashSet<&'a str>,
    symbols: SymbolTable,
    cnf: Cnf,
    counts: FamilyCounts,
}

impl<'a, P: PlanningProblem> Encoder<'a, P> {
    fn new(problem: &'a P, options: &'a EncoderOptions) -> Self {
        let relevant = problem
            .actions()
            .iter()
            .enumerate()
            .filter(|(_, action)| !action.is_trivial())
            .collect();
        Self {
            problem,
            options,
            relevant,
            changing: changing_predicates(problem.actions()),
            symbols: SymbolTable::new(),
            cnf: Cnf::default(),
            counts: FamilyCounts::default(),
        }
    }

    fn fluent(&mut self, atom: &Atom, step: usize, positive: bool) -> PackedLiteral {
        self.symbols.fluent_literal(atom, step, positive)
    }

    fn action(&mut self, index: usize, action: &Action, step: usize, positive: bool) -> PackedLiteral {
        self.symbols.action_literal(index, action, step, positive)
    }

    fn emit(&mut self, clause: Clause<PackedLiteral>) {
        self.cnf.add_clause(clause);
    }

    fn initial_state(&mut self) -> usize {
        let problem = self.problem;
        for atom in problem.fluents() {
            let holds = problem.initial_state().contains(atom);
            let lit = self.fluent(atom, 0, holds);
            self.emit(Clause::unit(lit));
        }
        problem.fluents().len()
    }

    fn goal_state(&mut self, horizon: usize) -> usize {
        let problem = self.problem;
        for atom in problem.goal_state() {
            let lit = self.fluent(atom, horizon, true);
            self.emit(Clause::unit(lit));
        }
        problem.goal_state().len()
    }

    /// `a@t → p@t` for preconditions, `a@t → e@t+1` / `a@t → ¬e@t+1` for effects.
    fn actions(&mut self, step: usize) -> usize {
        let before = self.cnf.len();
        let relevant = std::mem::take(&mut self.relevant);

        for &(index, action) in &relevant {
            let not_a = self.action(index, action, step, false);

            for atom in &action.precondition_pos {
                if !self.changing.contains(atom.predicate.as_str()) {
                    continue;
                }
                let p = self.fluent(atom, step, true);
                self.emit(Clause::unit(not_a).or(p));
            }
            if self.options.negative_preconditions {
                for atom in &action.precondition_neg {
                    if self.changing.contains(atom.predicate.as_str()) {
                        let not_p = self.fluent(atom, step, false);
                        self.emit(Clause::unit(not_a).or(not_p));
                    } else if self.problem.initial_state().contains(atom) {
                        // A static atom that holds forever: the action never applies.
                        self.emit(Clause::unit(not_a));
                    }
                }
            }
            for atom in &action.effect_pos {
                let e = self.fluent(atom, step + 1, true);
                self.emit(Clause::unit(not_a).or(e));
            }
            for atom in &action.effect_neg {
                let not_e = self.fluent(atom, step + 1, false);
                self.emit(Clause::unit(not_a).or(not_e));
            }
        }

        self.relevant = relevant;
        self.cnf.len() - before
    }

    /// `¬f@t ∧ f@t+1 → ⋁ adders@t` and `f@t ∧ ¬f@t+1 → ⋁ deleters@t`.
    ///
    /// An action that both adds and deletes `f` only counts as an adder.
    fn frame_axioms(&mut self, step: usize) -> usize {
        let before = self.cnf.len();
        let problem = self.problem;
        let relevant = std::mem::take(&mut self.relevant);

        for atom in problem.fluents() {
            let mut adders = Vec::new();
            let mut deleters = Vec::new();
            for &(index, action) in &relevant {
                if action.adds(atom) {
                    adders.push((index, action));
                } else if action.deletes(atom) {
                    deleters.push((index, action));
                }
            }

            if !adders.is_empty() {
                let mut clause = Clause::unit(self.fluent(atom, step, true));
                clause.push(self.fluent(atom, step + 1, false));
                for &(index, action) in &adders {
                    clause.push(self.action(index, action, step, true));
                }
                self.emit(clause);
            }
            if !deleters.is_empty() {
                let mut clause = Clause::unit(self.fluent(atom, step, false));
                clause.push(self.fluent(atom, step + 1, true));
                for &(index, action) in &deleters {
                    clause.push(self.action(index, action, step, true));
                }
                self.emit(clause);
            }
        }

        self.relevant = relevant;
        self.cnf.len() - before
    }

    /// `¬a1@t ∨ ¬a2@t` for every unordered pair of distinct actions.
    fn exclusion_axioms(&mut self, step: usize) -> usize {
        let before = self.cnf.len();
        let relevant = std::mem::take(&mut self.relevant);

        for (&(i, a1), &(j, a2)) in relevant.iter().tuple_combinations() {
            let not_a1 = self.action(i, a1, step, false);
            let not_a2 = self.action(j, a2, step, false);
            self.emit(Clause::unit(not_a1).or(not_a2));
        }

        self.relevant = relevant;
        self.cnf.len() - before
    }
}
