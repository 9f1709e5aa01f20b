use crate::sat::literal::{Literal, Variable};
use rustc_hash::FxHashSet;

/// A set of literals assumed true.
///
/// Literals are kept in the order they were committed so that two runs over the
/// same formula produce identical output. The solver never commits a literal whose
/// complement is already present; the model does not check this itself.
#[derive(Debug, Clone, Default)]
pub struct Model<L: Literal> {
    literals: Vec<L>,
    index: FxHashSet<L>,
}

impl<L: Literal> Model<L> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            literals: Vec::new(),
            index: FxHashSet::default(),
        }
    }

    /// Adds `literal`. Returns `false` if it was already present.
    pub fn insert(&mut self, literal: L) -> bool {
        if self.index.insert(literal) {
            self.literals.push(literal);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, literal: L) -> bool {
        self.index.contains(&literal)
    }

    /// The value the model gives `var`, if it mentions it.
    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        if self.contains(L::new(var, true)) {
            Some(true)
        } else if self.contains(L::new(var, false)) {
            Some(false)
        } else {
            None
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Literals in commit order.
    pub fn iter(&self) -> impl Iterator<Item = &L> {
        self.literals.iter()
    }

    /// The positive literals, in commit order.
    pub fn positives(&self) -> impl Iterator<Item = L> + '_ {
        self.literals.iter().copied().filter(|lit| lit.is_positive())
    }

    /// Drops every literal committed after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        for lit in self.literals.drain(len.min(self.literals.len())..) {
            self.index.remove(&lit);
        }
    }

    /// DIMACS-style integers in commit order.
    #[must_use]
    pub fn to_dimacs(&self) -> Vec<i32> {
        self.literals.iter().map(|lit| lit.to_i32()).collect()
    }
}

/// Two models are equal when they hold the same literals, whatever the commit order.
impl<L: Literal> PartialEq for Model<L> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<L: Literal> Eq for Model<L> {}

impl<L: Literal> FromIterator<L> for Model<L> {
    fn from_iter<T: IntoIterator<Item = L>>(iter: T) -> Self {
        let mut model = Self::new();
        for lit in iter {
            model.insert(lit);
        }
        model
    }
}

impl<L: Literal> Extend<L> for Model<L> {
    fn extend<T: IntoIterator<Item = L>>(&mut self, iter: T) {
        for lit in iter {
            self.insert(lit);
        }
    }
}
