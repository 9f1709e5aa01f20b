use crate::sat::literal::Literal;
use core::ops::Index;
use smallvec::SmallVec;

/// Inline capacity of a clause. Planning clauses are mostly binary; frame axioms
/// grow with the number of supporting actions and spill to the heap.
const INLINE_LITERALS: usize = 8;

/// An ordered disjunction of literals.
///
/// Equality is structural and order-sensitive. A clause with exactly one literal is
/// a unit clause; a clause with none is the empty clause, which marks a
/// contradiction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause<L: Literal> {
    pub literals: SmallVec<[L; INLINE_LITERALS]>,
}

impl<L: Literal> Clause<L> {
    #[must_use]
    pub fn new(literals: Vec<i32>) -> Self {
        literals.into_iter().map(L::from_i32).collect()
    }

    /// A single-literal clause.
    #[must_use]
    pub fn unit(literal: L) -> Self {
        let mut clause = Self::default();
        clause.push(literal);
        clause
    }

    /// Appends a literal to the disjunction.
    pub fn push(&mut self, literal: L) -> &mut Self {
        self.literals.push(literal);
        self
    }

    /// Builder-style variant of [`Clause::push`].
    #[must_use]
    pub fn or(mut self, literal: L) -> Self {
        self.push(literal);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &L> {
        self.literals.iter()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn contains(&self, literal: L) -> bool {
        self.literals.contains(&literal)
    }

    /// `true` if some literal of the clause is in `is_true`.
    pub fn is_satisfied_by(&self, mut is_true: impl FnMut(L) -> bool) -> bool {
        self.iter().any(|&lit| is_true(lit))
    }
}

impl<L: Literal> Index<usize> for Clause<L> {
    type Output = L;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl<L: Literal> FromIterator<L> for Clause<L> {
    fn from_iter<T: IntoIterator<Item = L>>(iter: T) -> Self {
        Self {
            literals: iter.into_iter().collect(),
        }
    }
}

impl<L: Literal> From<Vec<i32>> for Clause<L> {
    fn from(literals: Vec<i32>) -> Self {
        Self::new(literals)
    }
}

impl<L: Literal> From<&[L]> for Clause<L> {
    fn from(literals: &[L]) -> Self {
        literals.iter().copied().collect()
    }
}
