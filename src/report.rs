//! This module contains the final-form output of a tracing run: a plain,
//! serialisable summary of the constraints, events and variables that a
//! [`crate::tracer::Tracer`] accumulated.
//!
//! The report is deliberately flat. Read instructions are rendered into
//! their canonical printed form rather than carried as live node graphs, so
//! a report can outlive the tracer that produced it and cross process
//! boundaries as JSON.

use serde::{Deserialize, Serialize};

use crate::{
    event::{EventId, EventKind},
    memory::Pointer,
    registry::VariableId,
    tracer::Tracer,
};

/// The summary of everything a tracer recorded during one run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TraceReport {
    /// The recorded path constraints in insertion order, each rendered in
    /// the canonical printer format.
    constraints: Vec<String>,

    /// The filed memory events in filing order.
    events: Vec<EventRecord>,

    /// The registered variables in allocation order.
    variables: Vec<VariableRecord>,
}

impl TraceReport {
    /// Builds the report summarising everything `tracer` has recorded so
    /// far.
    #[must_use]
    pub fn of(tracer: &Tracer) -> Self {
        let constraints = tracer
            .constraint_entries()
            .iter()
            .map(|entry| entry.guard().to_string())
            .collect();

        let events = tracer
            .events()
            .iter()
            .map(|event| {
                let access = match event.kind() {
                    EventKind::Read { variable, version } => AccessRecord::Read {
                        variable: *variable,
                        version:  *version,
                    },
                    EventKind::Write { stored } => AccessRecord::Write {
                        stored: stored.to_string(),
                    },
                };
                EventRecord {
                    id:       event.id(),
                    pointers: event.address().pointers().iter().copied().collect(),
                    shared:   event.address().is_shared(),
                    access,
                }
            })
            .collect();

        let variables = tracer
            .variables()
            .into_iter()
            .map(|(id, name, symbolic)| VariableRecord { id, name, symbolic })
            .collect();

        Self {
            constraints,
            events,
            variables,
        }
    }

    /// Gets the recorded constraints in insertion order, each rendered in
    /// the canonical printer format.
    #[must_use]
    pub fn constraints(&self) -> &Vec<String> {
        &self.constraints
    }

    /// Gets the filed events in filing order.
    #[must_use]
    pub fn events(&self) -> &Vec<EventRecord> {
        &self.events
    }

    /// Gets the registered variables in allocation order.
    #[must_use]
    pub fn variables(&self) -> &Vec<VariableRecord> {
        &self.variables
    }

    /// Renders the constraints one per line, each line newline terminated,
    /// matching the output of
    /// [`crate::tracer::Tracer::write_path_constraints`].
    #[must_use]
    pub fn constraint_text(&self) -> String {
        self.constraints.iter().map(|line| format!("{line}\n")).collect()
    }
}

/// Additional utility functions to enable cleaner testing with the trace
/// report.
impl TraceReport {
    /// Checks if the report contains a constraint that renders exactly as
    /// `rendered`.
    #[must_use]
    pub fn has_constraint(&self, rendered: &str) -> bool {
        self.constraints.iter().any(|line| line == rendered)
    }

    /// Gets the number of events in the report.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Checks if the report is empty (no constraints, events or variables).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty() && self.events.is_empty() && self.variables.is_empty()
    }
}

impl Default for TraceReport {
    fn default() -> Self {
        let constraints = Vec::new();
        let events = Vec::new();
        let variables = Vec::new();
        Self {
            constraints,
            events,
            variables,
        }
    }
}

/// A single filed memory event in report form.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventRecord {
    /// The identity of the event, doubling as its sequence number.
    pub id: EventId,

    /// The pointers of the address the event touched, in increasing order.
    pub pointers: Vec<Pointer>,

    /// Whether the touched address was shared with another thread.
    pub shared: bool,

    /// The access the event recorded.
    pub access: AccessRecord,
}

/// The access payload of an event in report form.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AccessRecord {
    /// A read of `variable` at `version`.
    Read { variable: VariableId, version: u32 },

    /// A write storing the expression rendered as `stored`.
    Write { stored: String },
}

/// A single registered variable in report form.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct VariableRecord {
    /// The identity of the variable in the tracer's registry.
    pub id: VariableId,

    /// The name the registry allocated for the variable.
    pub name: String,

    /// Whether the variable reads symbolically.
    pub symbolic: bool,
}
