//! This module contains the definition of the [`ReadInstruction`] DAG and its
//! supporting types.
//!
//! A read instruction records the symbolic reading of a value: every
//! arithmetic, logical or comparison operation the host program performs on
//! symbolic data produces a fresh node over the operands' nodes. Nodes are
//! immutable, sorted at construction, and built bottom-up, so the resulting
//! structure is acyclic. Subtrees are shared rather than cloned; the chains
//! produced by bounded loop unwinding reuse each iteration's value in both
//! arms of the next.
//!
//! Tracing is concolic, so every node also carries the concrete value the
//! host actually computed for it. The value is folded eagerly when the node
//! is built, from the already-folded values of its children, which keeps
//! consulting it constant-time however deep the recorded chain has grown.

pub mod known;
pub mod sym;

use std::{
    fmt::{Display, Formatter},
    mem,
    rc::Rc,
};

use crate::{error::value, memory::Address, registry::VariableId, value::known::Value};

/// The type of shared references to read instructions.
///
/// Nodes own their children through this type; anything else that needs a
/// node to stay alive (the path condition, recorded events, solver terms)
/// holds another reference to it.
pub type SharedRead = Rc<ReadInstruction>;

/// The sort of a read instruction: what kind of value reading it produces.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Sort {
    /// A host-width integer.
    Int,

    /// A boolean.
    Bool,
}

impl Display for Sort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
        }
    }
}

/// The operators that combine two read instructions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOperator {
    /// Wrapping integer addition.
    Add,

    /// Wrapping integer subtraction.
    Sub,

    /// Wrapping integer multiplication.
    Mul,

    /// Logical conjunction.
    Land,

    /// Logical disjunction.
    Lor,

    /// Equality over operands of one sort.
    Eql,

    /// Strict integer less-than.
    Lss,
}

impl BinaryOperator {
    /// Gets the spelling of this operator in the canonical printer format.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Land => "&&",
            Self::Lor => "||",
            Self::Eql => "==",
            Self::Lss => "<",
        }
    }

    /// Gets the sort this operator requires of both operands, or [`None`]
    /// when it only requires the operands to agree with each other.
    #[must_use]
    pub fn operand_sort(self) -> Option<Sort> {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Lss => Some(Sort::Int),
            Self::Land | Self::Lor => Some(Sort::Bool),
            Self::Eql => None,
        }
    }

    /// Gets the sort of the value this operator produces.
    #[must_use]
    pub fn result_sort(self) -> Sort {
        match self {
            Self::Add | Self::Sub | Self::Mul => Sort::Int,
            Self::Land | Self::Lor | Self::Eql | Self::Lss => Sort::Bool,
        }
    }

    /// Applies this operator's concrete semantics to `lhs` and `rhs`.
    ///
    /// # Panics
    ///
    /// Panics if the operands do not have the sorts this operator requires;
    /// operands folded out of constructed nodes always do.
    #[must_use]
    pub fn apply(self, lhs: Value, rhs: Value) -> Value {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Land => lhs.land(rhs),
            Self::Lor => lhs.lor(rhs),
            Self::Eql => lhs.eql(rhs),
            Self::Lss => lhs.lss(rhs),
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The operators that transform a single read instruction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UnaryOperator {
    /// Logical negation; integers negate to whether they are zero.
    Not,
}

impl UnaryOperator {
    /// Gets the spelling of this operator in the canonical printer format.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
        }
    }

    /// Applies this operator's concrete semantics to `operand`.
    #[must_use]
    pub fn apply(self, operand: Value) -> Value {
        match self {
            Self::Not => !operand,
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single node in the read-instruction DAG.
///
/// The sort is fixed when the node is built and the checked constructors
/// reject operands whose sorts do not fit the operator, so a node that
/// exists is well sorted all the way down.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReadInstruction {
    /// The sort of value this read produces.
    sort: Sort,

    /// The concrete value the host computed for this read, folded at
    /// construction.
    concrete: Value,

    /// The payload distinguishing the five node shapes.
    data: ReadData,
}

/// The payloads of the five read-instruction shapes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadData {
    /// A value known outright, optionally valid only under a guard.
    Literal {
        value: Value,
        guard: Option<SharedRead>,
    },

    /// A read of a symbolic variable from memory.
    ///
    /// The variable's `name` and the concrete `snapshot` it held at read
    /// time are frozen into the node so that it prints standalone and stays
    /// meaningful after the tracer resets.
    Basic {
        variable: VariableId,
        version:  u32,
        address:  Address,
        name:     Rc<str>,
        snapshot: Value,
    },

    /// The application of a unary operator to one operand.
    Unary {
        op:      UnaryOperator,
        operand: SharedRead,
    },

    /// The application of a binary operator to two operands.
    Binary {
        op:  BinaryOperator,
        lhs: SharedRead,
        rhs: SharedRead,
    },

    /// A selection between two operands of one sort based on a boolean
    /// condition.
    Ternary {
        condition: SharedRead,
        if_true:   SharedRead,
        if_false:  SharedRead,
    },
}

impl ReadInstruction {
    /// Creates a literal node holding `value`.
    #[must_use]
    pub fn literal(value: Value) -> SharedRead {
        Rc::new(Self {
            sort: value.sort(),
            concrete: value,
            data: ReadData::Literal { value, guard: None },
        })
    }

    /// Creates a literal node holding `value`, valid only under `guard`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `guard` is not a boolean read.
    pub fn guarded_literal(value: Value, guard: SharedRead) -> value::Result<SharedRead> {
        if guard.sort() != Sort::Bool {
            return Err(value::Error::SortMismatch {
                operator: "literal guard",
                expected: Sort::Bool,
                found:    guard.sort(),
            });
        }

        Ok(Rc::new(Self {
            sort: value.sort(),
            concrete: value,
            data: ReadData::Literal {
                value,
                guard: Some(guard),
            },
        }))
    }

    /// Creates a basic node recording a read of the variable `variable` at
    /// `version` through `address`, freezing in the `name` and the concrete
    /// `snapshot` observed at read time.
    #[must_use]
    pub fn basic(
        variable: VariableId,
        version: u32,
        address: Address,
        name: impl Into<Rc<str>>,
        snapshot: Value,
    ) -> SharedRead {
        Rc::new(Self {
            sort: snapshot.sort(),
            concrete: snapshot,
            data: ReadData::Basic {
                variable,
                version,
                address,
                name: name.into(),
                snapshot,
            },
        })
    }

    /// Creates the logical negation of `operand`.
    ///
    /// Negation is defined for both sorts (an integer negates to whether it
    /// is zero), so this constructor cannot fail.
    #[must_use]
    pub fn not(operand: SharedRead) -> SharedRead {
        Rc::new(Self {
            sort: Sort::Bool,
            concrete: UnaryOperator::Not.apply(operand.concrete()),
            data: ReadData::Unary {
                op: UnaryOperator::Not,
                operand,
            },
        })
    }

    /// Creates the application of `op` to `lhs` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the operands' sorts do not fit the operator.
    pub fn binary(
        op: BinaryOperator,
        lhs: SharedRead,
        rhs: SharedRead,
    ) -> value::Result<SharedRead> {
        let sort = Self::binary_sort(op, &lhs, &rhs)?;
        Ok(Rc::new(Self {
            sort,
            concrete: op.apply(lhs.concrete(), rhs.concrete()),
            data: ReadData::Binary { op, lhs, rhs },
        }))
    }

    /// Creates the wrapping addition of `lhs` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if either operand is not an integer read.
    pub fn add(lhs: SharedRead, rhs: SharedRead) -> value::Result<SharedRead> {
        Self::binary(BinaryOperator::Add, lhs, rhs)
    }

    /// Creates the wrapping subtraction of `rhs` from `lhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if either operand is not an integer read.
    pub fn sub(lhs: SharedRead, rhs: SharedRead) -> value::Result<SharedRead> {
        Self::binary(BinaryOperator::Sub, lhs, rhs)
    }

    /// Creates the wrapping multiplication of `lhs` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if either operand is not an integer read.
    pub fn mul(lhs: SharedRead, rhs: SharedRead) -> value::Result<SharedRead> {
        Self::binary(BinaryOperator::Mul, lhs, rhs)
    }

    /// Creates the logical conjunction of `lhs` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if either operand is not a boolean read.
    pub fn land(lhs: SharedRead, rhs: SharedRead) -> value::Result<SharedRead> {
        Self::binary(BinaryOperator::Land, lhs, rhs)
    }

    /// Creates the logical disjunction of `lhs` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if either operand is not a boolean read.
    pub fn lor(lhs: SharedRead, rhs: SharedRead) -> value::Result<SharedRead> {
        Self::binary(BinaryOperator::Lor, lhs, rhs)
    }

    /// Creates the equality comparison of `lhs` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the operands have different sorts.
    pub fn eql(lhs: SharedRead, rhs: SharedRead) -> value::Result<SharedRead> {
        Self::binary(BinaryOperator::Eql, lhs, rhs)
    }

    /// Creates the strict less-than comparison of `lhs` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if either operand is not an integer read.
    pub fn lss(lhs: SharedRead, rhs: SharedRead) -> value::Result<SharedRead> {
        Self::binary(BinaryOperator::Lss, lhs, rhs)
    }

    /// Creates the selection of `if_true` or `if_false` based on
    /// `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `condition` is not a boolean read, or if the two
    /// arms have different sorts.
    pub fn ite(
        condition: SharedRead,
        if_true: SharedRead,
        if_false: SharedRead,
    ) -> value::Result<SharedRead> {
        let sort = Self::ternary_sort(&condition, &if_true, &if_false)?;
        let concrete = if condition.concrete().as_bool() {
            if_true.concrete()
        } else {
            if_false.concrete()
        };
        Ok(Rc::new(Self {
            sort,
            concrete,
            data: ReadData::Ternary {
                condition,
                if_true,
                if_false,
            },
        }))
    }

    /// Creates a binary node whose operand sorts the caller guarantees.
    pub(crate) fn binary_unchecked(
        op: BinaryOperator,
        lhs: SharedRead,
        rhs: SharedRead,
    ) -> SharedRead {
        debug_assert!(
            Self::binary_sort(op, &lhs, &rhs).is_ok(),
            "Operator {op:?} applied to ill-sorted operands"
        );
        Rc::new(Self {
            sort: op.result_sort(),
            concrete: op.apply(lhs.concrete(), rhs.concrete()),
            data: ReadData::Binary { op, lhs, rhs },
        })
    }

    /// Creates a ternary node whose operand sorts the caller guarantees.
    pub(crate) fn ite_unchecked(
        condition: SharedRead,
        if_true: SharedRead,
        if_false: SharedRead,
    ) -> SharedRead {
        debug_assert!(
            Self::ternary_sort(&condition, &if_true, &if_false).is_ok(),
            "Ternary selection applied to ill-sorted operands"
        );
        let concrete = if condition.concrete().as_bool() {
            if_true.concrete()
        } else {
            if_false.concrete()
        };
        Rc::new(Self {
            sort: if_true.sort(),
            concrete,
            data: ReadData::Ternary {
                condition,
                if_true,
                if_false,
            },
        })
    }

    /// Gets the sort of value this read produces.
    #[must_use]
    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// Gets the concrete value the host actually computed for this read.
    #[must_use]
    pub fn concrete(&self) -> Value {
        self.concrete
    }

    /// Gets the payload of this node.
    #[must_use]
    pub fn data(&self) -> &ReadData {
        &self.data
    }

    /// Gets the direct children of this node, if any.
    #[must_use]
    pub fn children(&self) -> Vec<&SharedRead> {
        match &self.data {
            ReadData::Literal { guard, .. } => guard.iter().collect(),
            ReadData::Basic { .. } => vec![],
            ReadData::Unary { operand, .. } => vec![operand],
            ReadData::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            ReadData::Ternary {
                condition,
                if_true,
                if_false,
            } => vec![condition, if_true, if_false],
        }
    }

    /// Dispatches on this node's shape, calling the matching method of
    /// `visitor` with the payload fields.
    ///
    /// The visitor decides whether and how to recurse; nothing is visited
    /// beyond this node.
    pub fn visit<'a>(&'a self, visitor: &mut impl ReadVisitor<'a>) {
        match &self.data {
            ReadData::Literal { value, guard } => visitor.visit_literal(value, guard.as_ref()),
            ReadData::Basic {
                variable,
                version,
                address,
                name,
                snapshot,
            } => visitor.visit_basic(*variable, *version, address, name, snapshot),
            ReadData::Unary { op, operand } => visitor.visit_unary(*op, operand),
            ReadData::Binary { op, lhs, rhs } => visitor.visit_binary(*op, lhs, rhs),
            ReadData::Ternary {
                condition,
                if_true,
                if_false,
            } => visitor.visit_ternary(condition, if_true, if_false),
        }
    }

    /// Checks whether any basic node occurs in the DAG rooted at this node.
    ///
    /// A read with no basic leaves folds to a single concrete value no
    /// matter what the solver assigns, which is what "not symbolic" means
    /// here.
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        struct Probe<'a> {
            work:  Vec<&'a ReadInstruction>,
            found: bool,
        }

        impl<'a> ReadVisitor<'a> for Probe<'a> {
            fn visit_literal(&mut self, _value: &'a Value, guard: Option<&'a SharedRead>) {
                if let Some(guard) = guard {
                    self.work.push(guard);
                }
            }

            fn visit_basic(
                &mut self,
                _variable: VariableId,
                _version: u32,
                _address: &'a Address,
                _name: &'a str,
                _snapshot: &'a Value,
            ) {
                self.found = true;
            }

            fn visit_unary(&mut self, _op: UnaryOperator, operand: &'a SharedRead) {
                self.work.push(operand);
            }

            fn visit_binary(
                &mut self,
                _op: BinaryOperator,
                lhs: &'a SharedRead,
                rhs: &'a SharedRead,
            ) {
                self.work.push(lhs);
                self.work.push(rhs);
            }

            fn visit_ternary(
                &mut self,
                condition: &'a SharedRead,
                if_true: &'a SharedRead,
                if_false: &'a SharedRead,
            ) {
                self.work.push(condition);
                self.work.push(if_true);
                self.work.push(if_false);
            }
        }

        let mut probe = Probe {
            work:  Vec::new(),
            found: false,
        };
        self.visit(&mut probe);

        while let Some(node) = probe.work.pop() {
            if probe.found {
                break;
            }
            node.visit(&mut probe);
        }

        probe.found
    }

    fn binary_sort(
        op: BinaryOperator,
        lhs: &ReadInstruction,
        rhs: &ReadInstruction,
    ) -> value::Result<Sort> {
        match op.operand_sort() {
            Some(expected) => {
                for side in [lhs, rhs] {
                    if side.sort() != expected {
                        return Err(value::Error::SortMismatch {
                            operator: op.symbol(),
                            expected,
                            found: side.sort(),
                        });
                    }
                }
            }
            None => {
                if lhs.sort() != rhs.sort() {
                    return Err(value::Error::SortMismatch {
                        operator: op.symbol(),
                        expected: lhs.sort(),
                        found:    rhs.sort(),
                    });
                }
            }
        }

        Ok(op.result_sort())
    }

    fn ternary_sort(
        condition: &ReadInstruction,
        if_true: &ReadInstruction,
        if_false: &ReadInstruction,
    ) -> value::Result<Sort> {
        if condition.sort() != Sort::Bool {
            return Err(value::Error::SortMismatch {
                operator: "?:",
                expected: Sort::Bool,
                found:    condition.sort(),
            });
        }
        if if_true.sort() != if_false.sort() {
            return Err(value::Error::BranchSortMismatch {
                if_true:  if_true.sort(),
                if_false: if_false.sort(),
            });
        }

        Ok(if_true.sort())
    }
}

/// A dispatch surface over the five read-instruction shapes.
///
/// Implementations receive one callback per visited node; traversal beyond
/// the visited node is up to the implementation.
pub trait ReadVisitor<'a> {
    /// Visits a literal node.
    fn visit_literal(&mut self, value: &'a Value, guard: Option<&'a SharedRead>);

    /// Visits a basic node.
    fn visit_basic(
        &mut self,
        variable: VariableId,
        version: u32,
        address: &'a Address,
        name: &'a str,
        snapshot: &'a Value,
    );

    /// Visits a unary node.
    fn visit_unary(&mut self, op: UnaryOperator, operand: &'a SharedRead);

    /// Visits a binary node.
    fn visit_binary(&mut self, op: BinaryOperator, lhs: &'a SharedRead, rhs: &'a SharedRead);

    /// Visits a ternary node.
    fn visit_ternary(
        &mut self,
        condition: &'a SharedRead,
        if_true: &'a SharedRead,
        if_false: &'a SharedRead,
    );
}

/// Dropping is iterative: loop unwinding at large bounds produces chains
/// tens of thousands of nodes deep, beyond what the derived recursive drop
/// can release without exhausting the stack.
impl Drop for ReadInstruction {
    fn drop(&mut self) {
        let mut work = Vec::new();
        self.data.take_children_into(&mut work);

        while let Some(child) = work.pop() {
            if let Some(mut node) = Rc::into_inner(child) {
                node.data.take_children_into(&mut work);
            }
        }
    }
}

impl ReadData {
    /// Replaces `self` with a childless literal, moving any children into
    /// `out`.
    fn take_children_into(&mut self, out: &mut Vec<SharedRead>) {
        let data = mem::replace(
            self,
            ReadData::Literal {
                value: Value::Bool(false),
                guard: None,
            },
        );

        match data {
            ReadData::Literal { guard, .. } => out.extend(guard),
            ReadData::Basic { .. } => {}
            ReadData::Unary { operand, .. } => out.push(operand),
            ReadData::Binary { lhs, rhs, .. } => {
                out.push(lhs);
                out.push(rhs);
            }
            ReadData::Ternary {
                condition,
                if_true,
                if_false,
            } => {
                out.push(condition);
                out.push(if_true);
                out.push(if_false);
            }
        }
    }
}

/// Pretty-prints the read in the canonical, test-stable format: literals as
/// their C-style value, basic nodes as `[<name>:<snapshot>]`, binary nodes
/// as `(<lhs><op><rhs>)`, negation as `(!<operand>)`, ternary selection as
/// `(<condition>?<if_true>:<if_false>)` and guarded literals as
/// `{<value> if <guard>}`.
///
/// The rendering walks the DAG with an explicit stack for the same
/// depth-robustness reasons as the drop.
impl Display for ReadInstruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        enum Step<'a> {
            Node(&'a ReadInstruction),
            Text(&'static str),
        }

        let mut work = vec![Step::Node(self)];

        while let Some(step) = work.pop() {
            let node = match step {
                Step::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Step::Node(node) => node,
            };

            match &node.data {
                ReadData::Literal { value, guard: None } => write!(f, "{value}")?,
                ReadData::Literal {
                    value,
                    guard: Some(guard),
                } => {
                    write!(f, "{{{value} if ")?;
                    work.push(Step::Text("}"));
                    work.push(Step::Node(guard));
                }
                ReadData::Basic { name, snapshot, .. } => write!(f, "[{name}:{snapshot}]")?,
                ReadData::Unary { op, operand } => {
                    write!(f, "({}", op.symbol())?;
                    work.push(Step::Text(")"));
                    work.push(Step::Node(operand));
                }
                ReadData::Binary { op, lhs, rhs } => {
                    f.write_str("(")?;
                    work.push(Step::Text(")"));
                    work.push(Step::Node(rhs));
                    work.push(Step::Text(op.symbol()));
                    work.push(Step::Node(lhs));
                }
                ReadData::Ternary {
                    condition,
                    if_true,
                    if_false,
                } => {
                    f.write_str("(")?;
                    work.push(Step::Text(")"));
                    work.push(Step::Node(if_false));
                    work.push(Step::Text(":"));
                    work.push(Step::Node(if_true));
                    work.push(Step::Text("?"));
                    work.push(Step::Node(condition));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::value,
        memory::{Address, Pointer},
        registry::VariableId,
        value::{known::Value, ReadInstruction, Sort},
    };

    fn synthetic_basic(name: &str, snapshot: Value) -> crate::value::SharedRead {
        ReadInstruction::basic(
            VariableId::new(0),
            0,
            Address::new(Pointer::new(0), true),
            name,
            snapshot,
        )
    }

    #[test]
    fn literals_display_their_c_style_value() {
        assert_eq!(ReadInstruction::literal(Value::from(12)).to_string(), "12");
        assert_eq!(
            ReadInstruction::literal(Value::from(true)).to_string(),
            "true"
        );
    }

    #[test]
    fn basic_nodes_display_name_and_snapshot() {
        let node = synthetic_basic("Var_0", Value::from(3));
        assert_eq!(node.to_string(), "[Var_0:3]");
    }

    #[test]
    fn binary_nodes_nest_with_parentheses() -> anyhow::Result<()> {
        let var = synthetic_basic("Var_0", Value::from(3));
        let sum = ReadInstruction::add(var, ReadInstruction::literal(Value::from(2)))?;
        let test = ReadInstruction::lss(sum, ReadInstruction::literal(Value::from(7)))?;

        assert_eq!(test.to_string(), "(([Var_0:3]+2)<7)");

        Ok(())
    }

    #[test]
    fn negation_wraps_its_operand() -> anyhow::Result<()> {
        let var = synthetic_basic("Var_0", Value::from(3));
        let sum = ReadInstruction::add(var, ReadInstruction::literal(Value::from(2)))?;
        let sum = ReadInstruction::add(sum, ReadInstruction::literal(Value::from(1)))?;
        let test = ReadInstruction::lss(sum, ReadInstruction::literal(Value::from(6)))?;
        let negated = ReadInstruction::not(test);

        assert_eq!(negated.to_string(), "(!((([Var_0:3]+2)+1)<6))");

        Ok(())
    }

    #[test]
    fn ternary_selection_displays_in_conditional_style() -> anyhow::Result<()> {
        let selection = ReadInstruction::ite(
            ReadInstruction::literal(Value::from(true)),
            ReadInstruction::literal(Value::from(1)),
            ReadInstruction::literal(Value::from(2)),
        )?;

        assert_eq!(selection.to_string(), "(true?1:2)");

        Ok(())
    }

    #[test]
    fn guarded_literals_display_their_guard() -> anyhow::Result<()> {
        let guard = synthetic_basic("g", Value::from(true));
        let literal = ReadInstruction::guarded_literal(Value::from(5), guard)?;

        assert_eq!(literal.to_string(), "{5 if [g:true]}");

        Ok(())
    }

    #[test]
    fn construction_rejects_ill_sorted_arithmetic() {
        let result = ReadInstruction::add(
            ReadInstruction::literal(Value::from(1)),
            ReadInstruction::literal(Value::from(true)),
        );

        assert_eq!(
            result.unwrap_err(),
            value::Error::SortMismatch {
                operator: "+",
                expected: Sort::Int,
                found:    Sort::Bool,
            }
        );
    }

    #[test]
    fn construction_rejects_ill_sorted_conjunction() {
        let result = ReadInstruction::land(
            ReadInstruction::literal(Value::from(1)),
            ReadInstruction::literal(Value::from(true)),
        );

        assert_eq!(
            result.unwrap_err(),
            value::Error::SortMismatch {
                operator: "&&",
                expected: Sort::Bool,
                found:    Sort::Int,
            }
        );
    }

    #[test]
    fn construction_rejects_mixed_sort_equality() {
        let result = ReadInstruction::eql(
            ReadInstruction::literal(Value::from(1)),
            ReadInstruction::literal(Value::from(false)),
        );

        assert_eq!(
            result.unwrap_err(),
            value::Error::SortMismatch {
                operator: "==",
                expected: Sort::Int,
                found:    Sort::Bool,
            }
        );
    }

    #[test]
    fn construction_rejects_non_boolean_conditions() {
        let result = ReadInstruction::ite(
            ReadInstruction::literal(Value::from(0)),
            ReadInstruction::literal(Value::from(1)),
            ReadInstruction::literal(Value::from(2)),
        );

        assert_eq!(
            result.unwrap_err(),
            value::Error::SortMismatch {
                operator: "?:",
                expected: Sort::Bool,
                found:    Sort::Int,
            }
        );
    }

    #[test]
    fn construction_rejects_disagreeing_ternary_arms() {
        let result = ReadInstruction::ite(
            ReadInstruction::literal(Value::from(true)),
            ReadInstruction::literal(Value::from(1)),
            ReadInstruction::literal(Value::from(false)),
        );

        assert_eq!(
            result.unwrap_err(),
            value::Error::BranchSortMismatch {
                if_true:  Sort::Int,
                if_false: Sort::Bool,
            }
        );
    }

    #[test]
    fn construction_rejects_non_boolean_literal_guards() {
        let result = ReadInstruction::guarded_literal(
            Value::from(5),
            ReadInstruction::literal(Value::from(7)),
        );

        assert_eq!(
            result.unwrap_err(),
            value::Error::SortMismatch {
                operator: "literal guard",
                expected: Sort::Bool,
                found:    Sort::Int,
            }
        );
    }

    #[test]
    fn nodes_know_their_sort() -> anyhow::Result<()> {
        let one = ReadInstruction::literal(Value::from(1));
        let two = ReadInstruction::literal(Value::from(2));

        assert_eq!(ReadInstruction::add(one.clone(), two.clone())?.sort(), Sort::Int);
        assert_eq!(ReadInstruction::lss(one.clone(), two.clone())?.sort(), Sort::Bool);
        assert_eq!(ReadInstruction::eql(one.clone(), two)?.sort(), Sort::Bool);
        assert_eq!(ReadInstruction::not(one).sort(), Sort::Bool);

        Ok(())
    }

    #[test]
    fn nodes_fold_their_concrete_value_eagerly() -> anyhow::Result<()> {
        let var = synthetic_basic("Var_0", Value::from(3));
        assert_eq!(var.concrete(), Value::from(3));

        let sum = ReadInstruction::add(var, ReadInstruction::literal(Value::from(2)))?;
        assert_eq!(sum.concrete(), Value::from(5));

        let test = ReadInstruction::lss(sum, ReadInstruction::literal(Value::from(7)))?;
        assert_eq!(test.concrete(), Value::from(true));
        assert_eq!(ReadInstruction::not(test).concrete(), Value::from(false));

        Ok(())
    }

    #[test]
    fn symbolic_probing_finds_basic_leaves() -> anyhow::Result<()> {
        let literal = ReadInstruction::literal(Value::from(4));
        assert!(!literal.is_symbolic());

        let var = synthetic_basic("Var_0", Value::from(3));
        assert!(var.is_symbolic());

        let nested = ReadInstruction::lss(
            ReadInstruction::add(var, ReadInstruction::literal(Value::from(2)))?,
            ReadInstruction::literal(Value::from(7)),
        )?;
        assert!(nested.is_symbolic());

        let concrete = ReadInstruction::add(
            ReadInstruction::literal(Value::from(1)),
            ReadInstruction::literal(Value::from(2)),
        )?;
        assert!(!concrete.is_symbolic());

        Ok(())
    }

    #[test]
    fn guarded_literals_probe_through_their_guard() -> anyhow::Result<()> {
        let guard = synthetic_basic("g", Value::from(true));
        let literal = ReadInstruction::guarded_literal(Value::from(5), guard)?;

        assert!(literal.is_symbolic());

        Ok(())
    }

    #[test]
    fn deep_chains_drop_without_exhausting_the_stack() -> anyhow::Result<()> {
        let mut node = ReadInstruction::literal(Value::from(0));
        for _ in 0..100_000 {
            node = ReadInstruction::add(node, ReadInstruction::literal(Value::from(1)))?;
        }

        drop(node);

        Ok(())
    }
}
