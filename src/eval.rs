//! This module contains the concrete evaluator for read-instruction DAGs.
//!
//! Every node folds to exactly one concrete [`Value`]: literals to their
//! stored value, basic nodes to the snapshot frozen in at read time (or to
//! an explicit binding, when the caller supplies one for that variable at
//! that version), and operator nodes to their operator applied to the folded
//! operands. A literal's guard conditions where the value is valid, not
//! what it folds to, so evaluation takes the stored value outright.
//!
//! The snapshot interpretation is folded into every node at construction,
//! so [`evaluate`] is a field read. Evaluation under bindings re-walks the
//! DAG, memoised on node identity: shared subtrees fold once, and the
//! unwinding chains that share each iteration's value across arms fold in
//! time linear in the number of distinct nodes.

use std::collections::HashMap;

use crate::{
    registry::VariableId,
    value::{known::Value, ReadData, ReadInstruction},
};

/// The memo table for evaluation under bindings, keyed by node identity.
///
/// A table is only meaningful for one fixed set of bindings and while the
/// roots that populated it are alive.
pub(crate) type EvalMemo = HashMap<*const ReadInstruction, Value>;

/// Folds `read` to the concrete value it denotes under the snapshots frozen
/// into its basic nodes.
#[must_use]
pub fn evaluate(read: &ReadInstruction) -> Value {
    read.concrete()
}

/// Folds `read` to the concrete value it denotes when each basic node bound
/// in `bindings` (keyed by variable and version) takes its bound value
/// instead of its snapshot.
#[must_use]
pub fn evaluate_with(
    read: &ReadInstruction,
    bindings: &HashMap<(VariableId, u32), Value>,
) -> Value {
    evaluate_with_memo(read, bindings, &mut EvalMemo::new())
}

/// Folds `read` under `bindings` as [`evaluate_with`], reusing `memo` so
/// that a caller folding many roots over shared structure pays for each
/// distinct node once rather than once per root.
#[allow(clippy::missing_panics_doc)] // The root is always in the memo after the walk.
pub(crate) fn evaluate_with_memo(
    read: &ReadInstruction,
    bindings: &HashMap<(VariableId, u32), Value>,
    memo: &mut EvalMemo,
) -> Value {
    let mut work: Vec<&ReadInstruction> = vec![read];

    while let Some(node) = work.last().copied() {
        let key: *const ReadInstruction = node;
        if memo.contains_key(&key) {
            work.pop();
            continue;
        }

        match node.data() {
            ReadData::Literal { value, .. } => {
                memo.insert(key, *value);
                work.pop();
            }
            ReadData::Basic {
                variable,
                version,
                snapshot,
                ..
            } => {
                let value = bindings
                    .get(&(*variable, *version))
                    .copied()
                    .unwrap_or(*snapshot);
                memo.insert(key, value);
                work.pop();
            }
            ReadData::Unary { op, operand } => match folded(&memo, operand) {
                Some(operand) => {
                    memo.insert(key, op.apply(operand));
                    work.pop();
                }
                None => work.push(operand),
            },
            ReadData::Binary { op, lhs, rhs } => {
                match (folded(&memo, lhs), folded(&memo, rhs)) {
                    (Some(lhs), Some(rhs)) => {
                        memo.insert(key, op.apply(lhs, rhs));
                        work.pop();
                    }
                    (lhs_folded, rhs_folded) => {
                        if rhs_folded.is_none() {
                            work.push(rhs);
                        }
                        if lhs_folded.is_none() {
                            work.push(lhs);
                        }
                    }
                }
            }
            ReadData::Ternary {
                condition,
                if_true,
                if_false,
            } => {
                match (
                    folded(&memo, condition),
                    folded(&memo, if_true),
                    folded(&memo, if_false),
                ) {
                    (Some(condition), Some(if_true), Some(if_false)) => {
                        let value = if condition.as_bool() { if_true } else { if_false };
                        memo.insert(key, value);
                        work.pop();
                    }
                    (condition_folded, if_true_folded, if_false_folded) => {
                        if if_false_folded.is_none() {
                            work.push(if_false);
                        }
                        if if_true_folded.is_none() {
                            work.push(if_true);
                        }
                        if condition_folded.is_none() {
                            work.push(condition);
                        }
                    }
                }
            }
        }
    }

    let key: *const ReadInstruction = read;
    *memo.get(&key).expect("Evaluated root was not in the memo")
}

fn folded(memo: &EvalMemo, node: &ReadInstruction) -> Option<Value> {
    let key: *const ReadInstruction = node;
    memo.get(&key).copied()
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use crate::{
        eval::{evaluate, evaluate_with},
        memory::{Address, Pointer},
        registry::VariableId,
        value::{known::Value, ReadInstruction, SharedRead},
    };

    fn symbolic_int(id: u64, version: u32, name: &str, snapshot: i64) -> SharedRead {
        ReadInstruction::basic(
            VariableId::new(id),
            version,
            Address::new(Pointer::new(0), true),
            name,
            Value::from(snapshot),
        )
    }

    #[test]
    fn literals_fold_to_their_value() {
        assert_eq!(
            evaluate(&ReadInstruction::literal(Value::from(42))),
            Value::from(42)
        );
        assert_eq!(
            evaluate(&ReadInstruction::literal(Value::from(false))),
            Value::from(false)
        );
    }

    #[test]
    fn basic_nodes_fold_to_their_snapshot() {
        let var = symbolic_int(0, 3, "Var_0", 7);
        assert_eq!(evaluate(&var), Value::from(7));
    }

    #[test]
    fn bindings_override_snapshots_at_the_bound_version() -> anyhow::Result<()> {
        let var = symbolic_int(0, 3, "Var_0", 7);
        let sum = ReadInstruction::add(var, ReadInstruction::literal(Value::from(1)))?;

        let mut bindings = HashMap::new();
        bindings.insert((VariableId::new(0), 3), Value::from(-2));

        assert_eq!(evaluate_with(&sum, &bindings), Value::from(-1));

        Ok(())
    }

    #[test]
    fn bindings_at_other_versions_are_ignored() -> anyhow::Result<()> {
        let var = symbolic_int(0, 3, "Var_0", 7);
        let sum = ReadInstruction::add(var, ReadInstruction::literal(Value::from(1)))?;

        let mut bindings = HashMap::new();
        bindings.insert((VariableId::new(0), 4), Value::from(-2));

        assert_eq!(evaluate_with(&sum, &bindings), Value::from(8));

        Ok(())
    }

    #[test]
    fn comparison_chains_fold_concretely() -> anyhow::Result<()> {
        let var = symbolic_int(0, 3, "Var_0", 3);
        let sum = ReadInstruction::add(var, ReadInstruction::literal(Value::from(2)))?;
        let sum = ReadInstruction::add(sum, ReadInstruction::literal(Value::from(1)))?;
        let test = ReadInstruction::lss(sum, ReadInstruction::literal(Value::from(6)))?;

        assert_eq!(evaluate(&test), Value::from(false));
        assert_eq!(evaluate(&ReadInstruction::not(test)), Value::from(true));

        Ok(())
    }

    #[test]
    fn negation_treats_zero_as_true() {
        let zero = ReadInstruction::literal(Value::from(0));
        assert_eq!(evaluate(&ReadInstruction::not(zero)), Value::from(true));

        let nonzero = ReadInstruction::literal(Value::from(3));
        assert_eq!(evaluate(&ReadInstruction::not(nonzero)), Value::from(false));
    }

    #[test]
    fn ternary_selection_follows_the_condition() -> anyhow::Result<()> {
        let selection = ReadInstruction::ite(
            ReadInstruction::literal(Value::from(false)),
            ReadInstruction::literal(Value::from(1)),
            ReadInstruction::literal(Value::from(2)),
        )?;

        assert_eq!(evaluate(&selection), Value::from(2));

        Ok(())
    }

    #[test]
    fn addition_wraps_at_the_host_width() -> anyhow::Result<()> {
        let max = ReadInstruction::literal(Value::from(i64::MAX));
        let sum = ReadInstruction::add(max, ReadInstruction::literal(Value::from(1)))?;

        assert_eq!(evaluate(&sum), Value::from(i64::MIN));

        Ok(())
    }

    #[test]
    fn shared_subtrees_fold_consistently() -> anyhow::Result<()> {
        let var = symbolic_int(0, 0, "Var_0", 5);
        let shared = ReadInstruction::add(var, ReadInstruction::literal(Value::from(1)))?;
        let diamond = ReadInstruction::eql(
            ReadInstruction::add(shared.clone(), ReadInstruction::literal(Value::from(2)))?,
            ReadInstruction::add(shared, ReadInstruction::literal(Value::from(2)))?,
        )?;

        assert_eq!(evaluate(&diamond), Value::from(true));

        Ok(())
    }

    #[test]
    fn deep_chains_fold_without_exhausting_the_stack() -> anyhow::Result<()> {
        let var = symbolic_int(0, 0, "Var_0", 0);
        let mut node = var;
        for _ in 0..100_000 {
            node = ReadInstruction::add(node, ReadInstruction::literal(Value::from(1)))?;
        }

        assert_eq!(evaluate(&node), Value::from(100_000));

        let mut bindings = HashMap::new();
        bindings.insert((VariableId::new(0), 0), Value::from(5));
        assert_eq!(evaluate_with(&node, &bindings), Value::from(100_005));

        Ok(())
    }
}
