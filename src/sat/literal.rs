#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Signed propositional literals as seen by the solver.
//!
//! Literals here are anonymous: a `Variable` is just an index. The planning layer
//! keeps the mapping from variables back to time-indexed propositions (see
//! `crate::planning::symbols`), so the solver never has to strip negation markers
//! out of structured data.

use core::ops::{Neg, Not};
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// Index of a propositional variable. Variables are 1-based so they map directly
/// onto DIMACS integers.
pub type Variable = u32;

/// The largest variable a [`PackedLiteral`] can hold.
pub const MAX_VARIABLE: Variable = 0x7FFF_FFFF;

/// A signed propositional variable.
pub trait Literal: Copy + Debug + Eq + Hash + Ord + Default {
    /// Builds a literal from a variable and its polarity (`true` = positive).
    fn new(var: Variable, polarity: bool) -> Self;

    /// The underlying variable.
    fn variable(self) -> Variable;

    /// `true` if the literal asserts its variable, `false` if it asserts the negation.
    fn polarity(self) -> bool;

    /// The complementary literal.
    #[must_use]
    fn negated(self) -> Self;

    fn is_negated(self) -> bool {
        !self.polarity()
    }

    fn is_positive(self) -> bool {
        self.polarity()
    }

    /// The same variable with positive polarity.
    #[must_use]
    fn positive(self) -> Self {
        Self::new(self.variable(), true)
    }

    /// The same variable with negative polarity.
    #[must_use]
    fn negative(self) -> Self {
        Self::new(self.variable(), false)
    }

    #[must_use]
    fn from_i32(value: i32) -> Self {
        let polarity = value.is_positive();
        let var = value.unsigned_abs();
        Self::new(var, polarity)
    }

    /// DIMACS representation.
    ///
    /// # Panics
    ///
    /// If the variable does not fit in an `i32`.
    fn to_i32(self) -> i32 {
        let var = i32::try_from(self.variable()).expect("variable overflowed i32");
        if self.polarity() { var } else { -var }
    }
}

/// A literal packed into a single `u32`: the low 31 bits hold the variable and the
/// high bit holds the polarity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackedLiteral(u32);

const POLARITY_BIT: u32 = 0x8000_0000;
const VARIABLE_MASK: u32 = MAX_VARIABLE;

impl Literal for PackedLiteral {
    fn new(var: Variable, polarity: bool) -> Self {
        debug_assert!(var <= MAX_VARIABLE, "variable {var} does not fit in 31 bits");
        Self(var & VARIABLE_MASK | (u32::from(polarity) << 31))
    }

    fn variable(self) -> Variable {
        self.0 & VARIABLE_MASK
    }

    fn polarity(self) -> bool {
        self.0 & POLARITY_BIT != 0
    }

    fn negated(self) -> Self {
        Self(self.0 ^ POLARITY_BIT)
    }
}

impl Debug for PackedLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_i32())
    }
}

impl Display for PackedLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_i32())
    }
}

impl From<i32> for PackedLiteral {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl Neg for PackedLiteral {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for PackedLiteral {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}
