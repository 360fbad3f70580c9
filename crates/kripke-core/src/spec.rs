// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Machine specifications: declared states, default fields, handlers.
//!
//! Specs are built once, validated and frozen by [`MachineSpecBuilder::freeze`]
//! before exploration begins, and shared immutably (via `Arc`) by every
//! machine instance cloned during exploration. Validation problems are
//! configuration errors: they are collected and reported as one aggregate
//! rather than failing on the first.
use thiserror::Error;

use crate::dispatch::{DispatchTable, HandlerFn, Trigger};
use crate::ident::StateId;
use crate::value::{Record, Value};

/// A declared state: a stable name plus a user payload (e.g. enum
/// discriminators).
///
/// State identity for dispatch is the declaration position ([`StateId`]),
/// not payload value-equality: two declarations with equal payloads are
/// distinct states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDecl {
    name: String,
    payload: Value,
}

impl StateDecl {
    /// The state's declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The user payload attached to the declaration.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Canonical rendering: the name, plus the payload when non-empty.
    #[must_use]
    pub fn render(&self) -> String {
        if matches!(&self.payload, Value::Record(r) if r.is_empty()) {
            self.name.clone()
        } else {
            format!("{}({})", self.name, self.payload)
        }
    }
}

/// One configuration problem found while freezing a spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// Two states were declared with the same name.
    #[error("machine {machine}: duplicate state declaration: {state}")]
    DuplicateState {
        /// Machine type tag.
        machine: String,
        /// Offending state name.
        state: String,
    },
    /// The requested initial state is not among the declared states.
    #[error("machine {machine}: initial state not declared: {state}")]
    UnknownInitialState {
        /// Machine type tag.
        machine: String,
        /// Requested initial state name.
        state: String,
    },
    /// The machine declares no states at all.
    #[error("machine {machine}: no states declared")]
    NoStates {
        /// Machine type tag.
        machine: String,
    },
    /// A handler was registered on a state name that was never declared.
    #[error("machine {machine}: handler registered on unknown state: {state}")]
    HandlerOnUnknownState {
        /// Machine type tag.
        machine: String,
        /// Unknown state name used at registration.
        state: String,
    },
}

/// Aggregate of configuration errors across all machines of a check.
///
/// Configuration errors are fatal: when any are present, exploration does
/// not run and the report carries the full aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecErrors(Vec<SpecError>);

impl SpecErrors {
    /// Wraps a list of errors.
    #[must_use]
    pub fn new(errors: Vec<SpecError>) -> Self {
        Self(errors)
    }

    /// The collected errors, in detection order.
    #[must_use]
    pub fn errors(&self) -> &[SpecError] {
        &self.0
    }

    /// Returns `true` when no errors were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of collected errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl core::fmt::Display for SpecErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SpecErrors {}

/// Frozen specification of one machine type.
#[derive(Debug)]
pub struct MachineSpec {
    type_tag: String,
    states: Vec<StateDecl>,
    initial: StateId,
    fields: Record,
    table: DispatchTable,
}

impl MachineSpec {
    /// Starts building a spec for the given type tag.
    #[must_use]
    pub fn builder(type_tag: impl Into<String>) -> MachineSpecBuilder {
        MachineSpecBuilder {
            type_tag: type_tag.into(),
            states: Vec::new(),
            initial: None,
            fields: Record::new(),
            registrations: Vec::new(),
        }
    }

    /// The machine's stable type tag.
    #[must_use]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Declared states in declaration order.
    #[must_use]
    pub fn states(&self) -> &[StateDecl] {
        &self.states
    }

    /// The declaration for `id`, when in range.
    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&StateDecl> {
        self.states.get(id.index())
    }

    /// Resolves a state name to its declaration identity.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn state_named(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|s| s.name() == name)
            .map(|i| StateId::from_raw(i as u32))
    }

    /// The initial state.
    #[must_use]
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// Default field values materialized into each fresh instance.
    #[must_use]
    pub fn default_fields(&self) -> &Record {
        &self.fields
    }

    /// Handlers registered for `(state, trigger)`, in registration order.
    pub(crate) fn handlers(&self, state: StateId, trigger: &Trigger) -> &[HandlerFn] {
        self.table.handlers(state, trigger)
    }
}

/// Accumulates declarations for a [`MachineSpec`].
///
/// This is the minimal spec-building surface the checker consumes; richer
/// authoring ergonomics live outside the core.
#[derive(Debug)]
pub struct MachineSpecBuilder {
    type_tag: String,
    states: Vec<StateDecl>,
    initial: Option<String>,
    fields: Record,
    registrations: Vec<(String, Trigger, HandlerFn)>,
}

impl MachineSpecBuilder {
    /// Declares a state with an empty payload.
    #[must_use]
    pub fn state(self, name: impl Into<String>) -> Self {
        self.state_with(name, Value::unit())
    }

    /// Declares a state carrying a user payload.
    #[must_use]
    pub fn state_with(mut self, name: impl Into<String>, payload: Value) -> Self {
        self.states.push(StateDecl {
            name: name.into(),
            payload,
        });
        self
    }

    /// Selects the initial state by name. When never called, the first
    /// declared state is the initial state.
    #[must_use]
    pub fn initial_state(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Declares a default field value.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.set(name, value.into());
        self
    }

    /// Registers an `OnEntry` handler for `state`.
    #[must_use]
    pub fn on_entry(mut self, state: impl Into<String>, handler: HandlerFn) -> Self {
        self.registrations
            .push((state.into(), Trigger::OnEntry, handler));
        self
    }

    /// Registers an `OnExit` handler for `state`.
    #[must_use]
    pub fn on_exit(mut self, state: impl Into<String>, handler: HandlerFn) -> Self {
        self.registrations
            .push((state.into(), Trigger::OnExit, handler));
        self
    }

    /// Registers an `OnEvent` handler for user events named `event` arriving
    /// in `state`.
    #[must_use]
    pub fn on_event(
        mut self,
        state: impl Into<String>,
        event: impl Into<String>,
        handler: HandlerFn,
    ) -> Self {
        self.registrations
            .push((state.into(), Trigger::OnEvent(event.into()), handler));
        self
    }

    /// Validates the declarations and freezes the spec.
    ///
    /// All configuration problems are collected; the spec is only produced
    /// when none were found.
    #[allow(clippy::cast_possible_truncation)]
    pub fn freeze(self) -> Result<MachineSpec, SpecErrors> {
        let mut errors = Vec::new();

        if self.states.is_empty() {
            errors.push(SpecError::NoStates {
                machine: self.type_tag.clone(),
            });
        }
        for (i, state) in self.states.iter().enumerate() {
            if self.states[..i].iter().any(|s| s.name() == state.name()) {
                errors.push(SpecError::DuplicateState {
                    machine: self.type_tag.clone(),
                    state: state.name().to_owned(),
                });
            }
        }

        let initial = match &self.initial {
            Some(name) => match self.states.iter().position(|s| s.name() == name) {
                Some(i) => StateId::from_raw(i as u32),
                None => {
                    errors.push(SpecError::UnknownInitialState {
                        machine: self.type_tag.clone(),
                        state: name.clone(),
                    });
                    StateId::from_raw(0)
                }
            },
            None => StateId::from_raw(0),
        };

        let mut table = DispatchTable::new(self.states.len());
        for (state_name, trigger, handler) in &self.registrations {
            match self.states.iter().position(|s| s.name() == *state_name) {
                Some(i) => table.register(StateId::from_raw(i as u32), trigger.clone(), *handler),
                None => errors.push(SpecError::HandlerOnUnknownState {
                    machine: self.type_tag.clone(),
                    state: state_name.clone(),
                }),
            }
        }

        if errors.is_empty() {
            Ok(MachineSpec {
                type_tag: self.type_tag,
                states: self.states,
                initial,
                fields: self.fields,
                table,
            })
        } else {
            Err(SpecErrors(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::event::Event;
    use crate::machine::Machine;
    use crate::mutator::Mutator;

    fn noop(_mx: &mut Mutator, _ev: &Event, _m: &Machine) {}

    #[test]
    fn freeze_defaults_to_first_declared_state() {
        let spec = MachineSpec::builder("Door")
            .state("Closed")
            .state("Open")
            .freeze()
            .unwrap();
        assert_eq!(spec.initial(), spec.state_named("Closed").unwrap());
    }

    #[test]
    fn freeze_collects_all_configuration_errors() {
        let err = MachineSpec::builder("Door")
            .state("Closed")
            .state("Closed")
            .initial_state("Ajar")
            .on_entry("Missing", noop)
            .freeze()
            .unwrap_err();
        assert_eq!(err.len(), 3);
        assert!(err.errors().iter().any(|e| matches!(
            e,
            SpecError::DuplicateState { state, .. } if state == "Closed"
        )));
        assert!(err.errors().iter().any(|e| matches!(
            e,
            SpecError::UnknownInitialState { state, .. } if state == "Ajar"
        )));
        assert!(err.errors().iter().any(|e| matches!(
            e,
            SpecError::HandlerOnUnknownState { state, .. } if state == "Missing"
        )));
    }

    #[test]
    fn equal_payloads_in_distinct_declarations_are_distinct_states() {
        let spec = MachineSpec::builder("Twin")
            .state_with("A", Value::Int(1))
            .state_with("B", Value::Int(1))
            .freeze()
            .unwrap();
        assert_ne!(spec.state_named("A"), spec.state_named("B"));
    }
}
