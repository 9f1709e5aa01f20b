//! Reading a plan off a satisfying model, and checking it by simulation.

use crate::planning::problem::{changing_predicates, Atom, PlanningProblem};
use crate::planning::symbols::{PlanLiteral, Symbol};
use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// One action of a plan, at its time step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanStep {
    pub step: usize,
    pub action: String,
    pub args: Vec<String>,
}

impl Display for PlanStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.action, self.args.join(", "))
    }
}

/// A sequential plan, ordered by step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("step {step}: no ground action {action}")]
    UnknownAction { step: usize, action: String },

    #[error("step {step}: {action} requires {atom}, which does not hold")]
    PreconditionUnmet {
        step: usize,
        action: String,
        atom: Atom,
    },

    #[error("step {step}: {action} requires {atom} to be false")]
    NegativePreconditionUnmet {
        step: usize,
        action: String,
        atom: Atom,
    },

    #[error("goal {0} does not hold after the last step")]
    GoalUnmet(Atom),
}

/// Keeps the positive action literals and orders them by step.
///
/// The sort is stable: actions at the same step keep their model order. A
/// sequential encoding never produces two, but a hand-built model might.
pub fn extract_plan<I>(literals: I) -> Plan
where
    I: IntoIterator<Item = PlanLiteral>,
{
    let mut steps: Vec<PlanStep> = literals
        .into_iter()
        .filter(|lit| lit.positive)
        .filter_map(|lit| match lit.proposition.symbol {
            Symbol::Action(action) => Some(PlanStep {
                step: lit.proposition.step,
                action,
                args: lit.proposition.args,
            }),
            Symbol::Fluent(_) => None,
        })
        .collect();
    steps.sort_by_key(|step| step.step);
    Plan { steps }
}

impl Plan {
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter()
    }

    /// Executes the plan from the initial state and checks the goal.
    ///
    /// Each action must have its positive preconditions hold before it runs
    /// (and, if `negative_preconditions` is set, its negative preconditions
    /// must not). Preconditions over predicates no action changes are taken as
    /// given, the same way the encoder treats them. Delete effects are applied
    /// before add effects.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate<P: PlanningProblem>(
        &self,
        problem: &P,
        negative_preconditions: bool,
    ) -> Result<(), PlanError> {
        let changing = changing_predicates(problem.actions());
        let mut state: FxHashSet<&Atom> = problem.initial_state().iter().collect();

        for step in &self.steps {
            let action = problem
                .action(&step.action, &step.args)
                .ok_or_else(|| PlanError::UnknownAction {
                    step: step.step,
                    action: step.to_string(),
                })?;

            if let Some(atom) = action
                .precondition_pos
                .iter()
                .filter(|atom| changing.contains(atom.predicate.as_str()))
                .find(|atom| !state.contains(atom))
            {
                return Err(PlanError::PreconditionUnmet {
                    step: step.step,
                    action: step.to_string(),
                    atom: atom.clone(),
                });
            }

            if negative_preconditions {
                if let Some(atom) = action.precondition_neg.iter().find(|atom| state.contains(atom)) {
                    return Err(PlanError::NegativePreconditionUnmet {
                        step: step.step,
                        action: step.to_string(),
                        atom: atom.clone(),
                    });
                }
            }

            for atom in &action.effect_neg {
                state.remove(atom);
            }
            state.extend(&action.effect_pos);
        }

        match problem.goal_state().iter().find(|goal| !state.contains(goal)) {
            Some(goal) => Err(PlanError::GoalUnmet(goal.clone())),
            None => Ok(()),
        }
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for step in &self.steps {
            writeln!(f, "{}: {step}", step.step)?;
        }
        Ok(())
    }
}
