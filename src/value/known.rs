//! This module contains the representation of concrete values observed while
//! the host program executes, together with the pure semantics of every
//! operator the read-instruction DAG can contain.
//!
//! # Widths
//!
//! Integers are host-platform words ([`i64`]); behaviour beyond that width is
//! whatever the wrapping host arithmetic produces. Booleans are a distinct
//! sort and never coerce silently, with one deliberate exception: logical
//! negation accepts integers and reads zero as true.

use std::fmt::{Display, Formatter};

use crate::value::Sort;

/// The type of data whose value is concretely known during a trace.
///
/// Every operator the evaluator implements lives here as a total function
/// over operands of the right sort. Operands of the wrong sort cannot be
/// produced by the checked node constructors, so the accessors treat them as
/// unreachable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    /// A host-width integer.
    Int(i64),

    /// A boolean.
    Bool(bool),
}

impl Value {
    /// Creates a value representing integer zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::Int(0)
    }

    /// Gets the sort of this value.
    #[must_use]
    pub fn sort(&self) -> Sort {
        match self {
            Self::Int(_) => Sort::Int,
            Self::Bool(_) => Sort::Bool,
        }
    }

    /// Gets the integer payload of this value.
    ///
    /// # Panics
    ///
    /// Panics if the value is not an integer. Values reached through the
    /// checked node constructors always have the sort their operator
    /// requires.
    #[must_use]
    pub fn as_int(self) -> i64 {
        match self {
            Self::Int(v) => v,
            Self::Bool(_) => unreachable!("Operand sorts are checked at construction"),
        }
    }

    /// Gets the boolean payload of this value.
    ///
    /// # Panics
    ///
    /// Panics if the value is not a boolean. Values reached through the
    /// checked node constructors always have the sort their operator
    /// requires.
    #[must_use]
    pub fn as_bool(self) -> bool {
        match self {
            Self::Bool(v) => v,
            Self::Int(_) => unreachable!("Operand sorts are checked at construction"),
        }
    }

    /// Computes logical conjunction of two boolean values.
    ///
    /// # Panics
    ///
    /// Panics if either operand is not a boolean (see [`Self::as_bool`]).
    #[must_use]
    pub fn land(self, rhs: Self) -> Self {
        Self::Bool(self.as_bool() && rhs.as_bool())
    }

    /// Computes logical disjunction of two boolean values.
    ///
    /// # Panics
    ///
    /// Panics if either operand is not a boolean (see [`Self::as_bool`]).
    #[must_use]
    pub fn lor(self, rhs: Self) -> Self {
        Self::Bool(self.as_bool() || rhs.as_bool())
    }

    /// Computes equality of two values of the same sort.
    ///
    /// Integer equality is numeric, so two spellings of the same number (such
    /// as `12` and `0xc`) compare equal.
    ///
    /// # Panics
    ///
    /// Panics if the operands have different sorts.
    #[must_use]
    pub fn eql(self, rhs: Self) -> Self {
        let result = match (self, rhs) {
            (Self::Int(l), Self::Int(r)) => l == r,
            (Self::Bool(l), Self::Bool(r)) => l == r,
            _ => unreachable!("Operand sorts are checked at construction"),
        };
        Self::Bool(result)
    }

    /// Computes strict less-than of two integer values.
    ///
    /// # Panics
    ///
    /// Panics if either operand is not an integer (see [`Self::as_int`]).
    #[must_use]
    pub fn lss(self, rhs: Self) -> Self {
        Self::Bool(self.as_int() < rhs.as_int())
    }
}

impl std::ops::Add<Value> for Value {
    type Output = Value;

    /// Performs wrapping addition of two integer values.
    fn add(self, rhs: Value) -> Self::Output {
        Value::Int(self.as_int().wrapping_add(rhs.as_int()))
    }
}

impl std::ops::Sub<Value> for Value {
    type Output = Value;

    /// Performs wrapping subtraction of two integer values.
    fn sub(self, rhs: Value) -> Self::Output {
        Value::Int(self.as_int().wrapping_sub(rhs.as_int()))
    }
}

impl std::ops::Mul<Value> for Value {
    type Output = Value;

    /// Performs wrapping multiplication of two integer values.
    fn mul(self, rhs: Value) -> Self::Output {
        Value::Int(self.as_int().wrapping_mul(rhs.as_int()))
    }
}

impl std::ops::Not for Value {
    type Output = Value;

    /// Computes the logical negation of `self`.
    ///
    /// Booleans negate as usual. An integer negates to whether it is zero, so
    /// `!0` is true and `!k` is false for any non-zero `k`.
    fn not(self) -> Self::Output {
        let result = match self {
            Value::Bool(b) => !b,
            Value::Int(i) => i == 0,
        };
        Value::Bool(result)
    }
}

impl From<i64> for Value {
    /// Obtains a value from a host-width integer.
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    /// Obtains a value from a boolean.
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Pretty-prints the value the way a C-style program text would spell it.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}
