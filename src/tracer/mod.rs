//! This module contains the tracer, the context that accumulates everything
//! a concolically-executed host program does: the variables it allocates,
//! the branch decisions it records, the path condition in force, and the
//! reads and writes it makes against abstract memory.
//!
//! Host code is expected to run concretely and consult the tracer at the
//! points of interest: [`Tracer::branch`] at conditionals,
//! [`Tracer::read_from`] and [`Tracer::write_to`] at memory accesses. Only
//! what is routed through the tracer leaves a trace; concrete control flow
//! that never consults it is invisible, which is the concolic trade.
//!
//! A process-wide instance is available through [`with_tracer`] for hosts
//! that do not want to thread a context through their calls. It is
//! thread-local, so the single-writer discipline the tracer assumes is
//! structural rather than policed.

use std::{
    cell::RefCell,
    fmt::{self, Write},
    rc::Rc,
};

use crate::{
    constant::{DEFAULT_VARIABLE_PREFIX, INITIAL_VERSION},
    error::{container::Locatable, memory, trace},
    event::{Event, EventId, EventKind, EventPredicate, EventRelation, SharedEvent},
    memory::{Address, Pointer},
    path::PathCondition,
    registry::{VariableId, VariableRegistry},
    report::TraceReport,
    value::{
        sym::{Sym, Symbolic},
        ReadInstruction, SharedRead, Sort,
    },
};

/// The tracer's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The prefix from which fresh variable names are allocated.
    ///
    /// Defaults to [`DEFAULT_VARIABLE_PREFIX`].
    pub variable_prefix: String,
}

impl Config {
    /// Sets the `variable_prefix` config parameter to `value`.
    #[must_use]
    pub fn with_variable_prefix(mut self, value: impl Into<String>) -> Self {
        self.variable_prefix = value.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        let variable_prefix = DEFAULT_VARIABLE_PREFIX.to_string();
        Self { variable_prefix }
    }
}

/// A host variable under tracing.
///
/// The variable pairs its registry identity and storage address with the
/// symbolic expression describing its current contents. Plain assignment
/// rewrites the expression in place; only memory reads made through
/// [`Tracer::read_from`] advance the variable's version.
#[derive(Clone, Debug)]
pub struct Variable<T: Symbolic> {
    /// The identity of this variable in the tracer's registry.
    id: VariableId,

    /// The address of this variable's own storage.
    address: Address,

    /// The expression describing the variable's current contents.
    current: Sym<T>,
}

impl<T: Symbolic> Variable<T> {
    /// Gets the identity of this variable in the tracer's registry.
    #[must_use]
    pub fn id(&self) -> VariableId {
        self.id
    }

    /// Gets the address of this variable's own storage.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Gets the expression describing the variable's current contents.
    #[must_use]
    pub fn sym(&self) -> &Sym<T> {
        &self.current
    }

    /// Gets the concrete value the variable currently holds.
    #[must_use]
    pub fn concrete(&self) -> T {
        self.current.concrete()
    }

    /// Assigns `value` to this variable.
    ///
    /// Assignment is a pure rewrite of the tracked expression. It does not
    /// advance the variable's version and files no event; route the access
    /// through [`Tracer::write_to`] as well if it should be visible to the
    /// event relation.
    pub fn assign(&mut self, value: Sym<T>) {
        self.current = value;
    }
}

/// One recorded branch decision.
#[derive(Clone, Debug)]
pub struct ConstraintEntry {
    /// The guard in taken form: the branch guard itself when the branch was
    /// taken, its negation when it was not.
    guard: SharedRead,

    /// The path condition in force when the decision was recorded,
    /// outermost guard first.
    condition: Vec<SharedRead>,
}

impl ConstraintEntry {
    /// Gets the recorded guard in taken form.
    #[must_use]
    pub fn guard(&self) -> &SharedRead {
        &self.guard
    }

    /// Gets the path condition in force when the decision was recorded.
    #[must_use]
    pub fn condition(&self) -> &[SharedRead] {
        &self.condition
    }
}

/// The concolic tracing context.
#[derive(Debug)]
pub struct Tracer {
    /// The configuration of the tracer.
    config: Config,

    /// Variable identities, names, flags and versions.
    registry: VariableRegistry,

    /// The guards in force for the currently-executing path.
    path: PathCondition,

    /// The ordered log of recorded branch decisions.
    constraints: Vec<ConstraintEntry>,

    /// Every filed event, in filing order.
    events: Vec<SharedEvent>,

    /// The pointer-indexed view of the filed events.
    relation: EventRelation,

    /// The identity the next filed event will receive.
    next_event: u64,

    /// The index the next allocated pointer will receive.
    next_pointer: usize,
}

impl Tracer {
    /// Constructs a new tracer operating under `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let registry = VariableRegistry::new(config.variable_prefix.clone());
        Self {
            config,
            registry,
            path: PathCondition::new(),
            constraints: Vec::new(),
            events: Vec::new(),
            relation: EventRelation::new(),
            next_event: 0,
            next_pointer: 0,
        }
    }

    /// Gets the configuration of this tracer.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Allocates a fresh symbolic integer variable whose concrete content
    /// starts as `initial`.
    ///
    /// The allocation freezes the variable's version-0 read: the returned
    /// variable's expression is a basic node carrying the fresh name and
    /// `initial` as its snapshot.
    pub fn fresh_symbolic(&mut self, initial: i64) -> Variable<i64> {
        self.fresh_variable(initial, true)
    }

    /// Allocates a fresh symbolic boolean variable whose concrete content
    /// starts as `initial`.
    pub fn fresh_symbolic_bool(&mut self, initial: bool) -> Variable<bool> {
        self.fresh_variable(initial, true)
    }

    /// Allocates a fresh concrete integer variable holding `initial`.
    ///
    /// Concrete variables trace as literals: reading one yields a literal
    /// node rather than a basic node, so nothing downstream treats it as an
    /// unknown.
    pub fn fresh_concrete(&mut self, initial: i64) -> Variable<i64> {
        self.fresh_variable(initial, false)
    }

    /// Records the host taking (or not taking) the branch guarded by
    /// `guard`, and returns the concrete truth of the guard for the host's
    /// own `if`.
    ///
    /// The recorded constraint is the guard in taken form: `guard` itself
    /// when the concrete evaluation says true, its negation when it says
    /// false.
    pub fn branch(&mut self, guard: &Sym<bool>) -> bool {
        let taken = guard.concrete();
        let recorded = if taken {
            guard.read().clone()
        } else {
            ReadInstruction::not(guard.read().clone())
        };
        self.push_constraint(recorded);

        taken
    }

    /// Records `guard` verbatim as a path constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `guard` is not a boolean read.
    pub fn add_path_constraint(&mut self, guard: SharedRead) -> trace::Result<()> {
        if guard.sort() != Sort::Bool {
            return Err(trace::Error::GuardNotBoolean {
                found: guard.sort(),
            }
            .locate(self.next_event));
        }
        self.push_constraint(guard);

        Ok(())
    }

    /// Writes the recorded constraints into `sink` in insertion order, one
    /// guard per line in the canonical printer format, each line newline
    /// terminated.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `sink` fails to accept the formatted output.
    pub fn write_path_constraints(&self, sink: &mut impl Write) -> fmt::Result {
        for entry in &self.constraints {
            writeln!(sink, "{}", entry.guard())?;
        }

        Ok(())
    }

    /// Gets the recorded branch decisions in insertion order, each with the
    /// path condition that was in force when it was recorded.
    #[must_use]
    pub fn constraint_entries(&self) -> &[ConstraintEntry] {
        &self.constraints
    }

    /// Allocates a pointer no previous allocation from this tracer has
    /// returned.
    pub fn fresh_pointer(&mut self) -> Pointer {
        let pointer = Pointer::new(self.next_pointer);
        self.next_pointer += 1;

        pointer
    }

    /// Builds the address holding exactly `pointers`, marked as `shared`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `pointers` is empty.
    pub fn address_for(
        &self,
        pointers: impl IntoIterator<Item = Pointer>,
        shared: bool,
    ) -> memory::Result<Address> {
        Address::from_pointers(pointers, shared)
    }

    /// Reads `variable` through `address`, which may be any alias of the
    /// variable's storage.
    ///
    /// The read advances the variable's version and files a read event. For
    /// a symbolic variable the result is a fresh basic node snapshotting the
    /// variable's current concrete value, and the variable's expression is
    /// rewritten to that node; a concrete variable reads as a literal.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `variable` is not registered with this tracer,
    /// which happens when it outlived a [`Tracer::reset`].
    pub fn read_from<T: Symbolic>(
        &mut self,
        variable: &mut Variable<T>,
        address: &Address,
    ) -> trace::Result<Sym<T>> {
        let symbolic = self.registry.is_symbolic(variable.id()).locate(self.next_event)?;
        let version = self.registry.next_version(variable.id()).locate(self.next_event)?;

        let read = if symbolic {
            let name = self.registry.name_of(variable.id()).locate(self.next_event)?.to_string();
            ReadInstruction::basic(
                variable.id(),
                version,
                address.clone(),
                name,
                variable.concrete().into_value(),
            )
        } else {
            ReadInstruction::literal(variable.concrete().into_value())
        };

        self.record_event(
            EventKind::Read {
                variable: variable.id(),
                version,
            },
            address.clone(),
        );

        let result = Sym::from_raw(read);
        variable.assign(result.clone());

        Ok(result)
    }

    /// Files a write event storing `value`'s read instruction at `address`.
    ///
    /// The tracer does not interpret the write; pairing it with the
    /// assignment that changes a variable's contents is the host's job.
    pub fn write_to<T: Symbolic>(&mut self, address: &Address, value: &Sym<T>) {
        self.record_event(
            EventKind::Write {
                stored: value.read().clone(),
            },
            address.clone(),
        );
    }

    /// Files an event of `kind` touching `address`, registering it in the
    /// event relation.
    pub fn record_event(&mut self, kind: EventKind, address: Address) -> SharedEvent {
        let event = Rc::new(Event::new(EventId::new(self.next_event), address, kind));
        self.next_event += 1;
        self.events.push(event.clone());
        self.relation.relate(&event);

        event
    }

    /// Gets every filed event in filing order.
    #[must_use]
    pub fn events(&self) -> &[SharedEvent] {
        &self.events
    }

    /// Gets the pointer-indexed view of the filed events.
    #[must_use]
    pub fn relation(&self) -> &EventRelation {
        &self.relation
    }

    /// Finds the filed events that touched `pointer` and satisfy
    /// `predicate`, in filing order.
    #[must_use]
    pub fn find_events(
        &self,
        pointer: Pointer,
        predicate: &impl EventPredicate,
    ) -> Vec<SharedEvent> {
        self.relation.find(pointer, predicate)
    }

    /// Gets the guards in force for the currently-executing path.
    #[must_use]
    pub fn path(&self) -> &PathCondition {
        &self.path
    }

    /// Gets the variables registered with this tracer as
    /// `(id, name, symbolic)` rows in allocation order.
    #[must_use]
    pub fn variables(&self) -> Vec<(VariableId, String, bool)> {
        self.registry.variables()
    }

    /// Builds the serialisable summary of everything recorded so far.
    #[must_use]
    pub fn report(&self) -> TraceReport {
        TraceReport::of(self)
    }

    /// Returns the tracer to its freshly-constructed state: constraints,
    /// events, the event relation, the path condition and the variable
    /// registry (including the name counter) are all cleared. The
    /// configuration survives.
    ///
    /// Variables allocated before the reset are stale afterwards; reading
    /// them reports [`trace::Error::UnknownVariable`].
    pub fn reset(&mut self) {
        self.registry.reset();
        self.path.clear();
        self.constraints.clear();
        self.events.clear();
        self.relation = EventRelation::new();
        self.next_event = 0;
        self.next_pointer = 0;
    }

    /// Gets mutable access to the path condition, for hosts that scope
    /// guards around regions themselves rather than through an
    /// [`crate::unwind::Unwinder`].
    ///
    /// Pushing and popping here changes what later constraints snapshot; it
    /// records nothing on its own.
    pub fn path_mut(&mut self) -> &mut PathCondition {
        &mut self.path
    }

    fn fresh_variable<T: Symbolic>(&mut self, initial: T, symbolic: bool) -> Variable<T> {
        let (id, name) = self.registry.fresh_name(symbolic);
        let address = Address::new(self.fresh_pointer(), false);

        let current = if symbolic {
            Sym::from_raw(ReadInstruction::basic(
                id,
                INITIAL_VERSION,
                address.clone(),
                name,
                initial.into_value(),
            ))
        } else {
            Sym::from_raw(ReadInstruction::literal(initial.into_value()))
        };

        Variable {
            id,
            address,
            current,
        }
    }

    fn push_constraint(&mut self, guard: SharedRead) {
        let condition = self.path.guards().to_vec();
        self.constraints.push(ConstraintEntry { guard, condition });
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

thread_local! {
    static TRACER: RefCell<Tracer> = RefCell::new(Tracer::default());
}

/// Runs `f` against the process-wide tracer of the current thread.
///
/// # Panics
///
/// Panics if `f` itself calls back into [`with_tracer`]; the instance is
/// handed out exclusively.
pub fn with_tracer<R>(f: impl FnOnce(&mut Tracer) -> R) -> R {
    TRACER.with(|tracer| f(&mut tracer.borrow_mut()))
}

/// Resets the process-wide tracer of the current thread, as
/// [`Tracer::reset`].
pub fn reset_tracer() {
    with_tracer(Tracer::reset);
}
