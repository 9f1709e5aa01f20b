//! Time-indexed propositions and their solver variables.
//!
//! The same fluent at two steps is two different propositions. Each proposition is
//! interned once into a solver [`Variable`]; the table maps variables back so a
//! model can be read as signed planning literals.

use crate::planning::problem::{Action, Atom};
use crate::sat::assignment::Model;
use crate::sat::literal::{Literal, PackedLiteral, Variable, MAX_VARIABLE};
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};

/// The base symbol of a proposition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// A fluent predicate name.
    Fluent(String),
    /// A ground action name.
    Action(String),
}

/// A ground fluent or action at a given step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Proposition {
    pub symbol: Symbol,
    pub args: Vec<String>,
    pub step: usize,
}

impl Proposition {
    #[must_use]
    pub fn fluent(atom: &Atom, step: usize) -> Self {
        Self {
            symbol: Symbol::Fluent(atom.predicate.clone()),
            args: atom.args.clone(),
            step,
        }
    }

    #[must_use]
    pub fn action(action: &Action, step: usize) -> Self {
        Self {
            symbol: Symbol::Action(action.name.clone()),
            args: action.args.clone(),
            step,
        }
    }

    #[must_use]
    pub const fn is_action(&self) -> bool {
        matches!(self.symbol, Symbol::Action(_))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match &self.symbol {
            Symbol::Fluent(name) | Symbol::Action(name) => name,
        }
    }
}

impl Display for Proposition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.symbol {
            Symbol::Fluent(name) => {
                write!(f, "({name}")?;
                for arg in &self.args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")@{}", self.step)
            }
            Symbol::Action(name) => write!(f, "{name}({})@{}", self.args.join(", "), self.step),
        }
    }
}

/// A signed proposition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanLiteral {
    pub proposition: Proposition,
    pub positive: bool,
}

impl PlanLiteral {
    #[must_use]
    pub const fn new(proposition: Proposition, positive: bool) -> Self {
        Self {
            proposition,
            positive,
        }
    }

    #[must_use]
    pub fn negated(&self) -> Self {
        Self::new(self.proposition.clone(), !self.positive)
    }
}

impl Display for PlanLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.positive {
            write!(f, "¬")?;
        }
        write!(f, "{}", self.proposition)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Key {
    Fluent(usize),
    Action(usize),
}

/// Interns propositions into 1-based solver variables, in first-use order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    atoms: FxHashMap<Atom, usize>,
    variables: FxHashMap<(Key, usize), Variable>,
    /// `propositions[v - 1]` is the proposition of variable `v`.
    propositions: Vec<Proposition>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The variable of `atom` at `step`.
    ///
    /// # Panics
    ///
    /// If the table already holds [`MAX_VARIABLE`] propositions.
    pub fn fluent(&mut self, atom: &Atom, step: usize) -> Variable {
        let next = self.atoms.len();
        let id = match self.atoms.get(atom) {
            Some(&id) => id,
            None => {
                self.atoms.insert(atom.clone(), next);
                next
            }
        };
        self.intern(Key::Fluent(id), step, || Proposition::fluent(atom, step))
    }

    /// The variable of the action at `index` in the problem's action list, at `step`.
    ///
    /// # Panics
    ///
    /// If the table already holds [`MAX_VARIABLE`] propositions.
    pub fn action(&mut self, index: usize, action: &Action, step: usize) -> Variable {
        self.intern(Key::Action(index), step, || Proposition::action(action, step))
    }

    pub fn fluent_literal(&mut self, atom: &Atom, step: usize, positive: bool) -> PackedLiteral {
        PackedLiteral::new(self.fluent(atom, step), positive)
    }

    pub fn action_literal(
        &mut self,
        index: usize,
        action: &Action,
        step: usize,
        positive: bool,
    ) -> PackedLiteral {
        PackedLiteral::new(self.action(index, action, step), positive)
    }

    fn intern(&mut self, key: Key, step: usize, proposition: impl FnOnce() -> Proposition) -> Variable {
        if let Some(&var) = self.variables.get(&(key, step)) {
            return var;
        }
        let var = variable_for(self.propositions.len() + 1);
        self.propositions.push(proposition());
        self.variables.insert((key, step), var);
        var
    }

    #[must_use]
    pub fn proposition(&self, var: Variable) -> Option<&Proposition> {
        self.propositions.get((var as usize).checked_sub(1)?)
    }

    /// The signed proposition of a solver literal.
    #[must_use]
    pub fn decode(&self, literal: PackedLiteral) -> Option<PlanLiteral> {
        self.proposition(literal.variable())
            .map(|proposition| PlanLiteral::new(proposition.clone(), literal.polarity()))
    }

    /// Decodes every literal of `model`, in commit order. Variables unknown to the
    /// table are skipped.
    #[must_use]
    pub fn decode_model(&self, model: &Model<PackedLiteral>) -> Vec<PlanLiteral> {
        model.iter().filter_map(|&lit| self.decode(lit)).collect()
    }

    /// Number of interned propositions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.propositions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.propositions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, &Proposition)> {
        (1..).zip(self.propositions.iter())
    }
}

/// The variable numbering the `count`-th proposition.
///
/// # Panics
///
/// If `count` is beyond [`MAX_VARIABLE`].
fn variable_for(count: usize) -> Variable {
    Variable::try_from(count)
        .ok()
        .filter(|&var| var <= MAX_VARIABLE)
        .expect("too many propositions for a 31-bit variable")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_limit() {
        assert_eq!(variable_for(1), 1);
        assert_eq!(variable_for(MAX_VARIABLE as usize), MAX_VARIABLE);
    }

    #[test]
    #[should_panic(expected = "too many propositions")]
    fn test_variable_past_limit_panics() {
        let _ = variable_for(MAX_VARIABLE as usize + 1);
    }

    #[test]
    fn test_interning_is_per_step() {
        let mut table = SymbolTable::new();
        let atom = Atom::new("at", ["rob", "loc1"]);

        let v0 = table.fluent(&atom, 0);
        let v1 = table.fluent(&atom, 1);
        assert_ne!(v0, v1);
        assert_eq!(table.fluent(&atom, 0), v0);
        assert_eq!(table.len(), 2);
        assert_eq!((v0, v1), (1, 2));
    }

    #[test]
    fn test_actions_and_fluents_do_not_collide() {
        let mut table = SymbolTable::new();
        let atom = Atom::new("move", ["rob"]);
        let action = Action::new("move", ["rob"]);

        let fluent = table.fluent(&atom, 0);
        let act = table.action(0, &action, 0);
        assert_ne!(fluent, act);
        assert!(table.proposition(act).is_some_and(Proposition::is_action));
        assert!(!table.proposition(fluent).is_some_and(Proposition::is_action));
    }

    #[test]
    fn test_decode() {
        let mut table = SymbolTable::new();
        let atom = Atom::new("at", ["rob", "loc2"]);
        let lit = table.fluent_literal(&atom, 1, false);

        let decoded = table.decode(lit).unwrap();
        assert_eq!(decoded.proposition, Proposition::fluent(&atom, 1));
        assert!(!decoded.positive);
        assert_eq!(decoded.to_string(), "¬(at rob loc2)@1");
        assert_eq!(decoded.negated().to_string(), "(at rob loc2)@1");
        assert_eq!(table.decode(PackedLiteral::new(99, true)), None);
        assert_eq!(table.proposition(0), None);
    }

    #[test]
    fn test_action_display() {
        let action = Action::new("move", ["rob", "loc1", "loc2"]);
        assert_eq!(
            Proposition::action(&action, 0).to_string(),
            "move(rob, loc1, loc2)@0"
        );
    }
}
