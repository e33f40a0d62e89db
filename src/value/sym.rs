//! This module contains [`Sym`], the typed wrapper through which host code
//! manipulates symbolic values.
//!
//! A `Sym<T>` is a handle to a read instruction whose sort is fixed by `T`,
//! so the operator overloads below can build nodes without re-checking
//! sorts at every step. Host arithmetic on these handles runs concretely
//! (via the snapshots frozen into the leaves) while growing the DAG that
//! records how the result was read.

use std::{
    marker::PhantomData,
    ops::{Add, BitAnd, BitOr, Mul, Not, Sub},
};

use crate::value::{known::Value, BinaryOperator, ReadInstruction, SharedRead, Sort};

mod private {
    pub trait Sealed {}

    impl Sealed for i64 {}
    impl Sealed for bool {}
}

/// The host types that symbolic values range over.
///
/// This trait is sealed; the two implementations below correspond to the
/// two [`Sort`]s and no others can exist.
pub trait Symbolic: private::Sealed + Copy {
    /// The sort of read instructions carrying this type.
    const SORT: Sort;

    /// Wraps `self` in a concrete [`Value`].
    fn into_value(self) -> Value;

    /// Unwraps `value` back into this type.
    ///
    /// # Panics
    ///
    /// Panics if `value` has the wrong sort; values folded out of reads of
    /// sort [`Self::SORT`] never do.
    fn from_value(value: Value) -> Self;
}

impl Symbolic for i64 {
    const SORT: Sort = Sort::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: Value) -> Self {
        value.as_int()
    }
}

impl Symbolic for bool {
    const SORT: Sort = Sort::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Self {
        value.as_bool()
    }
}

/// A symbolic value of host type `T`.
///
/// Cloning is cheap: the clone shares the underlying read instruction.
#[derive(Clone, Debug)]
pub struct Sym<T: Symbolic> {
    read:    SharedRead,
    phantom: PhantomData<T>,
}

impl<T: Symbolic> Sym<T> {
    /// Wraps `read`, which the caller guarantees has sort [`T::SORT`].
    ///
    /// [`T::SORT`]: Symbolic::SORT
    pub(crate) fn from_raw(read: SharedRead) -> Self {
        debug_assert_eq!(read.sort(), T::SORT, "Wrapped a read of the wrong sort");
        Self {
            read,
            phantom: PhantomData,
        }
    }

    /// Gets the read instruction recording how this value was computed.
    #[must_use]
    pub fn read(&self) -> &SharedRead {
        &self.read
    }

    /// Unwraps this value into its read instruction.
    #[must_use]
    pub fn into_read(self) -> SharedRead {
        self.read
    }

    /// Gets the concrete result the host actually computed for this value.
    #[must_use]
    pub fn concrete(&self) -> T {
        T::from_value(self.read.concrete())
    }

    /// Creates the value that selects `if_true` or `if_false` based on
    /// `condition`.
    #[must_use]
    pub fn ite(condition: &Sym<bool>, if_true: &Self, if_false: &Self) -> Self {
        Self::from_raw(ReadInstruction::ite_unchecked(
            condition.read.clone(),
            if_true.read.clone(),
            if_false.read.clone(),
        ))
    }
}

impl Sym<i64> {
    /// Creates the boolean value testing whether `self` is strictly less
    /// than `rhs`.
    #[must_use]
    pub fn lt(&self, rhs: &Self) -> Sym<bool> {
        Sym::from_raw(ReadInstruction::binary_unchecked(
            BinaryOperator::Lss,
            self.read.clone(),
            rhs.read.clone(),
        ))
    }

    /// Creates the boolean value testing whether `self` equals `rhs`.
    #[must_use]
    pub fn eq(&self, rhs: &Self) -> Sym<bool> {
        Sym::from_raw(ReadInstruction::binary_unchecked(
            BinaryOperator::Eql,
            self.read.clone(),
            rhs.read.clone(),
        ))
    }
}

impl From<i64> for Sym<i64> {
    fn from(value: i64) -> Self {
        Self::from_raw(ReadInstruction::literal(Value::Int(value)))
    }
}

impl From<bool> for Sym<bool> {
    fn from(value: bool) -> Self {
        Self::from_raw(ReadInstruction::literal(Value::Bool(value)))
    }
}

/// Computes the wrapping addition of `self` and `rhs`.
impl Add for Sym<i64> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_raw(ReadInstruction::binary_unchecked(
            BinaryOperator::Add,
            self.read,
            rhs.read,
        ))
    }
}

/// Computes the wrapping addition of `self` and the constant `rhs`.
impl Add<i64> for Sym<i64> {
    type Output = Self;

    fn add(self, rhs: i64) -> Self::Output {
        self + Self::from(rhs)
    }
}

/// Computes the wrapping subtraction of `rhs` from `self`.
impl Sub for Sym<i64> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_raw(ReadInstruction::binary_unchecked(
            BinaryOperator::Sub,
            self.read,
            rhs.read,
        ))
    }
}

/// Computes the wrapping subtraction of the constant `rhs` from `self`.
impl Sub<i64> for Sym<i64> {
    type Output = Self;

    fn sub(self, rhs: i64) -> Self::Output {
        self - Self::from(rhs)
    }
}

/// Computes the wrapping multiplication of `self` and `rhs`.
impl Mul for Sym<i64> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::from_raw(ReadInstruction::binary_unchecked(
            BinaryOperator::Mul,
            self.read,
            rhs.read,
        ))
    }
}

/// Computes the wrapping multiplication of `self` and the constant `rhs`.
impl Mul<i64> for Sym<i64> {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        self * Self::from(rhs)
    }
}

/// Computes the conjunction of `self` and `rhs`.
impl BitAnd for Sym<bool> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_raw(ReadInstruction::binary_unchecked(
            BinaryOperator::Land,
            self.read,
            rhs.read,
        ))
    }
}

/// Computes the disjunction of `self` and `rhs`.
impl BitOr for Sym<bool> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_raw(ReadInstruction::binary_unchecked(
            BinaryOperator::Lor,
            self.read,
            rhs.read,
        ))
    }
}

/// Computes the logical negation of `self`.
impl Not for Sym<bool> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_raw(ReadInstruction::not(self.read))
    }
}

/// Computes the logical negation of `self`, treating zero as true.
impl Not for Sym<i64> {
    type Output = Sym<bool>;

    fn not(self) -> Self::Output {
        Sym::from_raw(ReadInstruction::not(self.read))
    }
}
