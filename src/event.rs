//! This module contains the memory event relation: the record of which
//! reads and writes touched which memory locations.
//!
//! Events are registered under every pointer of the address they touched,
//! so a query for one alias of a shared location sees the accesses made
//! through the others. The relation is a true multimap: registering an
//! event twice records it twice, and no deduplication happens on lookup.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{
    data::vector_map::{FromUniqueIndex, VectorMap},
    memory::{Address, Pointer},
    registry::VariableId,
    value::SharedRead,
};

/// A unique, monotonically-increasing identity for a memory event.
///
/// Identities double as sequence numbers: an event with a smaller identity
/// happened before one with a larger identity.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct EventId(u64);

impl EventId {
    /// Constructs a new event identity wrapping `id`.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// The type of shared references to events.
///
/// One event registered under several pointers is the same event, not a
/// copy per pointer.
pub type SharedEvent = Rc<Event>;

/// A single access to a memory location.
#[derive(Clone, Debug)]
pub struct Event {
    id:      EventId,
    address: Address,
    kind:    EventKind,
}

impl Event {
    /// Constructs a new event with the identity `id`, touching `address`,
    /// of the kind `kind`.
    #[must_use]
    pub fn new(id: EventId, address: Address, kind: EventKind) -> Self {
        Self { id, address, kind }
    }

    /// Gets the identity of this event.
    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Gets the address this event touched.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Gets what kind of access this event was.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }
}

/// The kinds of memory access the relation distinguishes.
#[derive(Clone, Debug)]
pub enum EventKind {
    /// A read of a variable at a specific version.
    ///
    /// Two reads of the same variable at different versions are different
    /// events with different payloads.
    Read { variable: VariableId, version: u32 },

    /// A write storing the value described by `stored`.
    Write { stored: SharedRead },
}

/// A test evaluated against events during lookup.
///
/// Predicates are stateless singletons; [`EventRelation::find`] evaluates
/// them afresh against every event it iterates.
pub trait EventPredicate {
    /// Checks whether `event` satisfies this predicate.
    fn matches(&self, event: &Event) -> bool;
}

/// The predicate selecting read events.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadOnly;

impl EventPredicate for ReadOnly {
    fn matches(&self, event: &Event) -> bool {
        matches!(event.kind(), EventKind::Read { .. })
    }
}

/// The predicate selecting write events.
#[derive(Clone, Copy, Debug, Default)]
pub struct WriteOnly;

impl EventPredicate for WriteOnly {
    fn matches(&self, event: &Event) -> bool {
        matches!(event.kind(), EventKind::Write { .. })
    }
}

/// The predicate selecting every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyAccess;

impl EventPredicate for AnyAccess {
    fn matches(&self, _event: &Event) -> bool {
        true
    }
}

/// The multimap from pointers to the events that touched them.
#[derive(Clone, Debug, Default)]
pub struct EventRelation {
    events: VectorMap<Pointer, Vec<SharedEvent>>,
    count:  u64,
}

impl EventRelation {
    /// Constructs a new, empty relation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `event` under every pointer of the address it touched.
    pub fn relate(&mut self, event: &SharedEvent) {
        for pointer in event.address().pointers() {
            self.events.get_or_insert_default(pointer).push(event.clone());
        }
        self.count += 1;
    }

    /// Finds the events registered under `pointer` that satisfy
    /// `predicate`, in the order they were registered.
    #[must_use]
    pub fn find(&self, pointer: Pointer, predicate: &impl EventPredicate) -> Vec<SharedEvent> {
        self.events
            .get(&pointer)
            .into_iter()
            .flatten()
            .filter(|event| predicate.matches(event))
            .cloned()
            .collect()
    }

    /// Gets the pointers under which at least one event is registered, in
    /// increasing pointer order.
    #[must_use]
    pub fn pointers(&self) -> Vec<Pointer> {
        self.events
            .iter()
            .filter(|(_, events)| !events.is_empty())
            .map(|(index, _)| Pointer::from_index(index))
            .collect()
    }

    /// Gets the number of registrations made into this relation.
    ///
    /// An event touching an address with several pointers counts once here,
    /// even though it can be found under each of those pointers.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Checks whether anything has been registered into the relation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
