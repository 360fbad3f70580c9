// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Handler dispatch: (state identity, trigger) to registered handlers.
//!
//! The table is built during spec construction and frozen before exploration
//! begins; registration order within a bucket is preserved and is the order
//! in which non-deterministic handler branches are enumerated.
use std::collections::BTreeMap;

use crate::event::Event;
use crate::ident::StateId;
use crate::machine::Machine;
use crate::mutator::Mutator;

/// Handler callback.
///
/// Handlers are plain function pointers: pure reactions whose only permitted
/// side effects flow through the [`Mutator`]. The `&Machine` argument is the
/// post-pop copy of the machine being stepped; reads against it observe the
/// pre-handler field values. Handlers must return without blocking or
/// performing external I/O.
pub type HandlerFn = fn(&mut Mutator, &Event, &Machine);

/// What a handler registration reacts to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Trigger {
    /// The machine entered the state.
    OnEntry,
    /// The machine is leaving the state.
    OnExit,
    /// A user event of the named type arrived while in the state.
    OnEvent(String),
}

/// Dispatch table for one machine type, rows indexed by [`StateId`].
#[derive(Debug, Clone, Default)]
pub(crate) struct DispatchTable {
    rows: Vec<BTreeMap<Trigger, Vec<HandlerFn>>>,
}

impl DispatchTable {
    /// Creates an empty table with one row per declared state.
    pub(crate) fn new(state_count: usize) -> Self {
        Self {
            rows: vec![BTreeMap::new(); state_count],
        }
    }

    /// Appends a handler to the `(state, trigger)` bucket.
    ///
    /// Multiple registrations for the same key are kept in order; each is an
    /// independent non-deterministic branch during exploration.
    pub(crate) fn register(&mut self, state: StateId, trigger: Trigger, handler: HandlerFn) {
        debug_assert!(state.index() < self.rows.len(), "state row out of range");
        if let Some(row) = self.rows.get_mut(state.index()) {
            row.entry(trigger).or_default().push(handler);
        }
    }

    /// Returns the handlers for `(state, trigger)` in registration order.
    pub(crate) fn handlers(&self, state: StateId, trigger: &Trigger) -> &[HandlerFn] {
        self.rows
            .get(state.index())
            .and_then(|row| row.get(trigger))
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_a(_mx: &mut Mutator, _ev: &Event, _m: &Machine) {}
    fn noop_b(_mx: &mut Mutator, _ev: &Event, _m: &Machine) {}

    #[test]
    fn registration_order_is_preserved() {
        let mut table = DispatchTable::new(1);
        let state = StateId::from_raw(0);
        table.register(state, Trigger::OnEntry, noop_a);
        table.register(state, Trigger::OnEntry, noop_b);
        let handlers = table.handlers(state, &Trigger::OnEntry);
        assert_eq!(handlers.len(), 2);
        assert!(std::ptr::fn_addr_eq(handlers[0], noop_a as HandlerFn));
        assert!(std::ptr::fn_addr_eq(handlers[1], noop_b as HandlerFn));
    }

    #[test]
    fn unmatched_trigger_yields_no_handlers() {
        let table = DispatchTable::new(1);
        let state = StateId::from_raw(0);
        assert!(table.handlers(state, &Trigger::OnExit).is_empty());
        assert!(table
            .handlers(state, &Trigger::OnEvent("Nope".to_owned()))
            .is_empty());
    }
}
