// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Runtime state of one machine instance within a world.
use std::sync::Arc;

use crate::ident::{MachineId, StateId};
use crate::queue::EventQueue;
use crate::spec::{MachineSpec, StateDecl};
use crate::value::{Record, Value};

/// One machine instance: current state, fields, queue, halted flag.
///
/// Machines are cloned by value whenever a successor world is built; the
/// spec is shared immutably via `Arc`. Identity is the machine's index in
/// the world's machine array ([`MachineId`]), which is preserved by cloning,
/// so cross-machine reference fields stay valid in every successor.
///
/// # Invariants
/// - `state` indexes into `spec.states()`.
/// - Once `halted` is set the queue is empty and stays empty; the machine
///   generates no further transitions.
#[derive(Debug, Clone)]
pub struct Machine {
    spec: Arc<MachineSpec>,
    id: MachineId,
    state: StateId,
    fields: Record,
    queue: EventQueue,
    halted: bool,
}

impl Machine {
    /// Materializes a fresh instance: initial state, default fields, empty
    /// queue.
    pub(crate) fn materialize(spec: Arc<MachineSpec>, id: MachineId) -> Self {
        let state = spec.initial();
        let fields = spec.default_fields().clone();
        Self {
            spec,
            id,
            state,
            fields,
            queue: EventQueue::new(),
            halted: false,
        }
    }

    /// This machine's identity: its index in the world's machine array.
    #[must_use]
    pub fn id(&self) -> MachineId {
        self.id
    }

    /// The frozen spec this instance was materialized from.
    #[must_use]
    pub fn spec(&self) -> &MachineSpec {
        &self.spec
    }

    pub(crate) fn spec_arc(&self) -> &Arc<MachineSpec> {
        &self.spec
    }

    /// The machine's type tag.
    #[must_use]
    pub fn type_tag(&self) -> &str {
        self.spec.type_tag()
    }

    /// Identity of the current state.
    #[must_use]
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Declaration of the current state.
    #[must_use]
    pub fn state_decl(&self) -> Option<&StateDecl> {
        self.spec.state(self.state)
    }

    /// Name of the current state, or `"?"` if the state index is somehow out
    /// of range (guarded against elsewhere).
    #[must_use]
    pub fn state_name(&self) -> &str {
        self.state_decl().map_or("?", StateDecl::name)
    }

    /// Resolves a declared state name to its identity, for `goto` targets.
    #[must_use]
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.spec.state_named(name)
    }

    /// Reads a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// All fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &Record {
        &self.fields
    }

    /// The machine's pending event queue.
    #[must_use]
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Whether the machine has halted.
    #[must_use]
    pub fn halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn set_state(&mut self, state: StateId) {
        self.state = state;
    }

    pub(crate) fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.set(name, value);
    }

    pub(crate) fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    pub(crate) fn set_halted(&mut self) {
        self.halted = true;
        self.queue.clear();
    }

    /// Appends the machine's canonical encoding to `out`: type tag, state
    /// index, fields, queue, halted flag.
    pub(crate) fn canonical_bytes(&self, out: &mut Vec<u8>) {
        let tag = self.spec.type_tag().as_bytes();
        out.extend_from_slice(&(tag.len() as u64).to_le_bytes());
        out.extend_from_slice(tag);
        out.extend_from_slice(&self.state.value().to_le_bytes());
        self.fields.canonical_bytes(out);
        self.queue.canonical_bytes(out);
        out.push(u8::from(self.halted));
    }
}

impl PartialEq for Machine {
    /// Deep value equality: spec identity, current state, fields, queue,
    /// halted flag. Used as the secondary guard behind fingerprint equality.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.spec, &other.spec)
            && self.id == other.id
            && self.state == other.state
            && self.fields == other.fields
            && self.queue == other.queue
            && self.halted == other.halted
    }
}

impl Eq for Machine {}
