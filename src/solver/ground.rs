//! This module contains [`GroundSolver`], the crate's reference
//! satisfiability back-end.
//!
//! The solver decides assertion sets over the crate's own read-instruction
//! DAGs by purely ground means: it never reasons symbolically, it only
//! propagates, grounds and tries concrete assignments. That is enough to
//! decide the feasibility queries concolic tracing produces, where most
//! leaves are pinned by definitional equalities and the rest range over a
//! handful of interesting values.
//!
//! A check runs in three stages:
//!
//! 1. *Propagation* (when `macro_finder` is set): assertions of the shape
//!    `variable == literal` (or a bare boolean variable, or its negation)
//!    force a binding for that variable at that version. Two assertions
//!    forcing different values for one binding are already unsatisfiable.
//! 2. *Grounding*: every assertion all of whose leaves are forced is folded
//!    under the forced bindings. A false fold refutes the whole set, since
//!    the bindings hold in every model; a true fold discharges the
//!    assertion.
//! 3. *Witness search*: the assertions still open range over unforced
//!    leaves. Candidate values per leaf (its snapshot, boundary constants,
//!    and literals harvested from the open assertions, each nudged by one)
//!    are tried in a deterministic order, at most `mbqi_max_iterations`
//!    assignments in total. An assignment under which every open assertion
//!    folds true is a verified witness.
//!
//! Verdicts are sound in both directions; when the search exhausts its
//! candidates or its budget the honest answer is
//! [`Satisfiability::Unknown`].
//!
//! All three stages walk the DAGs memoised on node identity, so sets whose
//! assertions share structure (the unwinding chains, where every guard is a
//! prefix of the final value) are processed in time linear in the number of
//! distinct nodes.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    error::solver,
    eval::{evaluate_with_memo, EvalMemo},
    memory::Address,
    registry::VariableId,
    solver::{Config, DynSolver, Satisfiability, Solver, Term},
    value::{
        known::Value,
        BinaryOperator, ReadData, ReadInstruction, ReadVisitor, SharedRead, Sort, UnaryOperator,
    },
};

/// A binding environment: concrete values forced or tried for basic leaves.
type Bindings = HashMap<(VariableId, u32), Value>;

/// The crate's reference satisfiability back-end.
#[derive(Clone, Debug)]
pub struct GroundSolver {
    /// The configuration of this back-end.
    config: Config,

    /// The asserted boolean reads, in assertion order.
    assertions: Vec<SharedRead>,
}

impl GroundSolver {
    /// Constructs a new ground solver operating under `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            assertions: Vec::new(),
        }
    }

    /// Wraps `self` into a [`DynSolver`].
    #[must_use]
    pub fn in_box(self) -> DynSolver {
        Box::new(self)
    }

    /// Gets the configuration of this back-end.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets the asserted reads, in assertion order.
    #[must_use]
    pub fn assertions(&self) -> &[SharedRead] {
        &self.assertions
    }

    /// Collects the bindings forced by definitional assertions, or reports
    /// the conflict that makes the set unsatisfiable outright.
    fn propagate(&self) -> Result<Bindings, Satisfiability> {
        let mut forced = Bindings::new();
        if !self.config.macro_finder {
            return Ok(forced);
        }

        for assertion in &self.assertions {
            let Some((leaf, value)) = definitional_binding(assertion) else {
                continue;
            };
            match forced.get(&leaf) {
                Some(existing) if *existing != value => return Err(Satisfiability::Unsat),
                _ => {
                    forced.insert(leaf, value);
                }
            }
        }

        Ok(forced)
    }
}

impl Solver for GroundSolver {
    fn term_of(&mut self, read: &SharedRead) -> solver::Result<Term> {
        Ok(Term::new(read.clone()))
    }

    fn add(&mut self, term: Term) -> solver::Result<()> {
        if term.read().sort() != Sort::Bool {
            return Err(solver::Error::TermNotBoolean {
                found: term.read().sort(),
            });
        }
        self.assertions.push(term.read().clone());

        Ok(())
    }

    fn check(&mut self) -> Satisfiability {
        let forced = match self.propagate() {
            Ok(forced) => forced,
            Err(verdict) => return verdict,
        };

        // Grounding: fold every assertion that the forced bindings fully
        // determine. The fold memo is shared across assertions, so prefix
        // chains cost their distinct nodes once.
        let mut freedom = FreedomMemo::new();
        let mut memo = EvalMemo::new();
        let mut open = Vec::new();
        for assertion in &self.assertions {
            if depends_on_free(assertion, &forced, &mut freedom) {
                open.push(assertion.clone());
            } else if !evaluate_with_memo(assertion, &forced, &mut memo).as_bool() {
                return Satisfiability::Unsat;
            }
        }
        if open.is_empty() {
            return Satisfiability::Sat;
        }

        // Witness search over the unforced leaves of the open assertions.
        let mut harvest = Harvest::new(&forced);
        for assertion in &open {
            harvest.collect(assertion);
        }

        let slots: Vec<((VariableId, u32), Vec<Value>)> = harvest
            .leaves
            .iter()
            .map(|(leaf, snapshot)| (*leaf, candidates_for(*snapshot, &harvest.literals)))
            .collect();

        let mut indices = vec![0_usize; slots.len()];
        let mut evaluations = 0_usize;
        loop {
            if evaluations == self.config.mbqi_max_iterations {
                return Satisfiability::Unknown;
            }
            evaluations += 1;

            let mut bindings = forced.clone();
            for (slot, index) in slots.iter().zip(&indices) {
                bindings.insert(slot.0, slot.1[*index]);
            }

            let mut memo = EvalMemo::new();
            if open
                .iter()
                .all(|assertion| evaluate_with_memo(assertion, &bindings, &mut memo).as_bool())
            {
                return Satisfiability::Sat;
            }

            // Advance the assignment odometer; carrying out of the last
            // slot means every combination has been tried.
            let mut slot = 0;
            loop {
                if slot == indices.len() {
                    return Satisfiability::Unknown;
                }
                indices[slot] += 1;
                if indices[slot] < slots[slot].1.len() {
                    break;
                }
                indices[slot] = 0;
                slot += 1;
            }
        }
    }
}

/// The default back-end operates under the default [`Config`].
impl Default for GroundSolver {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Extracts the binding forced by `assertion` if it is definitional: a
/// variable equated with a literal, a bare boolean variable (forced true),
/// or a negated variable (forced false for booleans, zero for integers).
fn definitional_binding(assertion: &ReadInstruction) -> Option<((VariableId, u32), Value)> {
    match assertion.data() {
        ReadData::Binary {
            op: BinaryOperator::Eql,
            lhs,
            rhs,
        } => match (lhs.data(), rhs.data()) {
            (
                ReadData::Basic {
                    variable, version, ..
                },
                ReadData::Literal { value, .. },
            )
            | (
                ReadData::Literal { value, .. },
                ReadData::Basic {
                    variable, version, ..
                },
            ) => Some(((*variable, *version), *value)),
            _ => None,
        },
        ReadData::Basic {
            variable, version, ..
        } => Some(((*variable, *version), Value::Bool(true))),
        ReadData::Unary {
            op: UnaryOperator::Not,
            operand,
        } => match operand.data() {
            ReadData::Basic {
                variable, version, ..
            } => {
                let value = match operand.sort() {
                    Sort::Bool => Value::Bool(false),
                    Sort::Int => Value::Int(0),
                };
                Some(((*variable, *version), value))
            }
            _ => None,
        },
        _ => None,
    }
}

type FreedomMemo = HashMap<*const ReadInstruction, bool>;

/// Checks whether folding `read` depends on any basic leaf that `forced`
/// does not bind.
///
/// A guarded literal folds to its stored value whatever its guard says, so
/// guards contribute no free leaves here.
fn depends_on_free(read: &ReadInstruction, forced: &Bindings, memo: &mut FreedomMemo) -> bool {
    let mut work: Vec<&ReadInstruction> = vec![read];

    while let Some(node) = work.last().copied() {
        let key: *const ReadInstruction = node;
        if memo.contains_key(&key) {
            work.pop();
            continue;
        }

        match node.data() {
            ReadData::Literal { .. } => {
                memo.insert(key, false);
                work.pop();
            }
            ReadData::Basic {
                variable, version, ..
            } => {
                memo.insert(key, !forced.contains_key(&(*variable, *version)));
                work.pop();
            }
            ReadData::Unary { operand, .. } => match free_of(memo, operand) {
                Some(operand) => {
                    memo.insert(key, operand);
                    work.pop();
                }
                None => work.push(operand),
            },
            ReadData::Binary { lhs, rhs, .. } => match (free_of(memo, lhs), free_of(memo, rhs)) {
                (Some(lhs_free), Some(rhs_free)) => {
                    memo.insert(key, lhs_free || rhs_free);
                    work.pop();
                }
                (lhs_free, rhs_free) => {
                    if rhs_free.is_none() {
                        work.push(rhs);
                    }
                    if lhs_free.is_none() {
                        work.push(lhs);
                    }
                }
            },
            ReadData::Ternary {
                condition,
                if_true,
                if_false,
            } => {
                match (
                    free_of(memo, condition),
                    free_of(memo, if_true),
                    free_of(memo, if_false),
                ) {
                    (Some(condition), Some(if_true), Some(if_false)) => {
                        memo.insert(key, condition || if_true || if_false);
                        work.pop();
                    }
                    (condition_free, if_true_free, if_false_free) => {
                        if if_false_free.is_none() {
                            work.push(if_false);
                        }
                        if if_true_free.is_none() {
                            work.push(if_true);
                        }
                        if condition_free.is_none() {
                            work.push(condition);
                        }
                    }
                }
            }
        }
    }

    let key: *const ReadInstruction = read;
    *memo.get(&key).expect("Walked root was not in the memo")
}

fn free_of(memo: &FreedomMemo, node: &ReadInstruction) -> Option<bool> {
    let key: *const ReadInstruction = node;
    memo.get(&key).copied()
}

/// The leaf and literal harvest over the open assertions: unforced leaves
/// with their snapshots (ordered for deterministic search), integer
/// literals in first-visit order, and the visited set that keeps shared
/// structure from being walked twice.
struct Harvest<'a> {
    forced:   &'a Bindings,
    visited:  HashSet<*const ReadInstruction>,
    work:     Vec<&'a ReadInstruction>,
    leaves:   BTreeMap<(VariableId, u32), Value>,
    literals: Vec<i64>,
}

impl<'a> Harvest<'a> {
    fn new(forced: &'a Bindings) -> Self {
        Self {
            forced,
            visited: HashSet::new(),
            work: Vec::new(),
            leaves: BTreeMap::new(),
            literals: Vec::new(),
        }
    }

    fn collect(&mut self, root: &'a ReadInstruction) {
        self.enqueue(root);
        while let Some(node) = self.work.pop() {
            node.visit(self);
        }
    }

    fn enqueue(&mut self, node: &'a ReadInstruction) {
        let key: *const ReadInstruction = node;
        if self.visited.insert(key) {
            self.work.push(node);
        }
    }
}

impl<'a> ReadVisitor<'a> for Harvest<'a> {
    fn visit_literal(&mut self, value: &'a Value, _guard: Option<&'a SharedRead>) {
        if let Value::Int(value) = value {
            self.literals.push(*value);
        }
    }

    fn visit_basic(
        &mut self,
        variable: VariableId,
        version: u32,
        _address: &'a Address,
        _name: &'a str,
        snapshot: &'a Value,
    ) {
        if !self.forced.contains_key(&(variable, version)) {
            self.leaves.insert((variable, version), *snapshot);
        }
    }

    fn visit_unary(&mut self, _op: UnaryOperator, operand: &'a SharedRead) {
        self.enqueue(operand);
    }

    fn visit_binary(&mut self, _op: BinaryOperator, lhs: &'a SharedRead, rhs: &'a SharedRead) {
        self.enqueue(lhs);
        self.enqueue(rhs);
    }

    fn visit_ternary(
        &mut self,
        condition: &'a SharedRead,
        if_true: &'a SharedRead,
        if_false: &'a SharedRead,
    ) {
        self.enqueue(condition);
        self.enqueue(if_true);
        self.enqueue(if_false);
    }
}

/// Builds the ordered candidate list for one leaf: its snapshot and the
/// snapshot's neighbours, the boundary constants, then every harvested
/// literal and its neighbours. Duplicates keep their first position.
fn candidates_for(snapshot: Value, literals: &[i64]) -> Vec<Value> {
    match snapshot {
        Value::Bool(value) => vec![Value::Bool(value), Value::Bool(!value)],
        Value::Int(value) => {
            let mut seen = HashSet::new();
            let mut candidates = Vec::new();
            let mut push = |candidate: i64| {
                if seen.insert(candidate) {
                    candidates.push(Value::Int(candidate));
                }
            };

            push(value);
            push(value.wrapping_sub(1));
            push(value.wrapping_add(1));
            push(0);
            push(1);
            push(-1);
            for &literal in literals {
                push(literal);
                push(literal.wrapping_sub(1));
                push(literal.wrapping_add(1));
            }

            candidates
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::solver,
        solver::{ground::GroundSolver, Config, Satisfiability, Solver},
        tracer::Tracer,
        value::{known::Value, sym::Sym, ReadInstruction, Sort},
    };

    fn assert_all(
        solver: &mut GroundSolver,
        reads: impl IntoIterator<Item = crate::value::SharedRead>,
    ) -> anyhow::Result<()> {
        for read in reads {
            let term = solver.term_of(&read)?;
            solver.add(term)?;
        }
        Ok(())
    }

    #[test]
    fn empty_assertion_sets_are_satisfiable() {
        assert_eq!(GroundSolver::default().check(), Satisfiability::Sat);
    }

    #[test]
    fn non_boolean_assertions_are_rejected() -> anyhow::Result<()> {
        let mut solver = GroundSolver::default();
        let term = solver.term_of(&ReadInstruction::literal(Value::from(3)))?;

        let error = solver.add(term).unwrap_err();
        assert_eq!(error, solver::Error::TermNotBoolean { found: Sort::Int });

        Ok(())
    }

    #[test]
    fn conflicting_definitions_refute_the_set() -> anyhow::Result<()> {
        let mut tracer = Tracer::default();
        let x = tracer.fresh_symbolic(3);

        let mut solver = GroundSolver::default();
        assert_all(
            &mut solver,
            [
                x.sym().eq(&Sym::from(1)).into_read(),
                x.sym().eq(&Sym::from(2)).into_read(),
            ],
        )?;

        assert_eq!(solver.check(), Satisfiability::Unsat);

        Ok(())
    }

    #[test]
    fn without_propagation_conflicts_degrade_to_unknown() -> anyhow::Result<()> {
        let mut tracer = Tracer::default();
        let x = tracer.fresh_symbolic(3);

        let mut solver = GroundSolver::new(Config::default().with_macro_finder(false));
        assert_all(
            &mut solver,
            [
                x.sym().eq(&Sym::from(1)).into_read(),
                x.sym().eq(&Sym::from(2)).into_read(),
            ],
        )?;

        assert_eq!(solver.check(), Satisfiability::Unknown);

        Ok(())
    }

    #[test]
    fn grounding_refutes_determined_false_assertions() -> anyhow::Result<()> {
        let mut tracer = Tracer::default();
        let x = tracer.fresh_symbolic(3);

        let mut solver = GroundSolver::default();
        assert_all(
            &mut solver,
            [
                x.sym().eq(&Sym::from(4)).into_read(),
                x.sym().lt(&Sym::from(4)).into_read(),
            ],
        )?;

        assert_eq!(solver.check(), Satisfiability::Unsat);

        Ok(())
    }

    #[test]
    fn witness_search_finds_satisfying_assignments() -> anyhow::Result<()> {
        let mut tracer = Tracer::default();
        let x = tracer.fresh_symbolic(3);

        // False under the snapshot (3 < 3 fails), true one candidate over.
        let mut solver = GroundSolver::default();
        assert_all(&mut solver, [Sym::from(3).lt(x.sym()).into_read()])?;

        assert_eq!(solver.check(), Satisfiability::Sat);

        Ok(())
    }

    #[test]
    fn boolean_leaves_search_both_polarities() -> anyhow::Result<()> {
        let mut tracer = Tracer::default();
        let flag = tracer.fresh_symbolic_bool(false);

        // With propagation off the bare assertion forces nothing, so the
        // verdict has to come from trying both polarities of the leaf.
        let mut solver = GroundSolver::new(Config::default().with_macro_finder(false));
        assert_all(&mut solver, [flag.sym().read().clone()])?;

        assert_eq!(solver.check(), Satisfiability::Sat);

        Ok(())
    }

    #[test]
    fn exhausted_candidates_yield_unknown() -> anyhow::Result<()> {
        let mut tracer = Tracer::default();
        let x = tracer.fresh_symbolic(3);

        // x * x == 2 has no integer model, but refuting it is beyond a
        // ground search.
        let square = x.sym().clone() * x.sym().clone();
        let mut solver = GroundSolver::default();
        assert_all(&mut solver, [square.eq(&Sym::from(2)).into_read()])?;

        assert_eq!(solver.check(), Satisfiability::Unknown);

        Ok(())
    }

    #[test]
    fn the_iteration_budget_caps_the_search() -> anyhow::Result<()> {
        let mut tracer = Tracer::default();
        let x = tracer.fresh_symbolic(0);

        // Satisfiable (x = 41), but not under the first candidate, so a
        // budget of one assignment has to give up.
        let assertion = (x.sym().clone() + 1).eq(&Sym::from(42));

        let mut capped = GroundSolver::new(Config::default().with_mbqi_max_iterations(1));
        assert_all(&mut capped, [assertion.read().clone()])?;
        assert_eq!(capped.check(), Satisfiability::Unknown);

        let mut relaxed = GroundSolver::default();
        assert_all(&mut relaxed, [assertion.read().clone()])?;
        assert_eq!(relaxed.check(), Satisfiability::Sat);

        Ok(())
    }

    #[test]
    fn back_ends_are_reachable_through_downcasting() -> anyhow::Result<()> {
        let mut tracer = Tracer::default();
        let x = tracer.fresh_symbolic(3);

        let mut solver = GroundSolver::default().in_box();
        let term = solver.term_of(x.sym().lt(&Sym::from(8)).read())?;
        solver.add(term)?;

        let ground = solver
            .as_any()
            .downcast_ref::<GroundSolver>()
            .expect("The boxed back-end is a ground solver");
        assert_eq!(ground.assertions().len(), 1);
        assert_eq!(ground.assertions()[0].to_string(), "([Var_0:3]<8)");

        Ok(())
    }
}
