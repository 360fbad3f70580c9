// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared world-dump schema types for the kripke model checker.
//!
//! These DTOs describe the structured document emitted by the checker's dump
//! entry point. The document is encoded as deterministic CBOR by the core;
//! downstream visualizers and diff tools decode it against this crate so that
//! the wire shape has exactly one definition.
//!
//! Versioning contract
//! - `WorldsDocV1` is append-only: new optional fields may be added, existing
//!   keys never change meaning. Breaking changes mint a `V2` document.
//! - `id` values are small dense integers assigned during exploration. They
//!   may be renumbered across runs; every other key is semantic.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

/// Format version carried in [`WorldsDocV1::version`].
pub const WORLDS_DOC_VERSION: u16 = 1;

/// Top-level world-dump document (v1).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldsDocV1 {
    /// Document format version (always [`WORLDS_DOC_VERSION`] for this type).
    pub version: u16,
    /// Every world discovered during exploration, in id order.
    pub worlds: Vec<WorldEntryV1>,
    /// Every transition edge recorded during exploration.
    pub edges: Vec<EdgeEntryV1>,
}

/// One explored world.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldEntryV1 {
    /// Dense world identifier (root is `0`). Stable within a run only.
    pub id: u32,
    /// Whether any registered invariant failed on this world.
    pub invariant_violation: bool,
    /// All pending events across the world's machines, queue order preserved.
    pub queued_events: Vec<QueuedEventV1>,
    /// Snapshot of every machine in declaration order.
    pub state_machines: Vec<StateMachineV1>,
}

/// One pending event in some machine's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueuedEventV1 {
    /// Event name (`Entry`, `Exit`, `Transition`, `Halt`, or the user event type).
    pub event_name: String,
    /// Display name of the machine whose queue holds the event.
    pub target_machine: String,
    /// Canonical string rendering of the event payload fields.
    pub details: String,
}

/// Snapshot of a single machine within a world.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateMachineV1 {
    /// Display name of the machine.
    pub name: String,
    /// Canonical rendering of the current state (name plus payload, if any).
    pub state: String,
    /// Canonical rendering of the machine's user fields.
    pub details: String,
}

/// One transition edge between explored worlds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeEntryV1 {
    /// Source world id.
    pub from: u32,
    /// Successor world id.
    pub to: u32,
    /// Display name of the machine that was stepped.
    pub machine: String,
    /// Name of the event that was delivered.
    pub event_name: String,
    /// Index of the handler that fired, when one did. `None` for system-event
    /// steps and for events that matched no handler.
    pub handler: Option<u32>,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn sample_doc() -> WorldsDocV1 {
        WorldsDocV1 {
            version: WORLDS_DOC_VERSION,
            worlds: vec![WorldEntryV1 {
                id: 0,
                invariant_violation: false,
                queued_events: vec![QueuedEventV1 {
                    event_name: "Entry".to_string(),
                    target_machine: "Order".to_string(),
                    details: String::new(),
                }],
                state_machines: vec![StateMachineV1 {
                    name: "Order".to_string(),
                    state: "Pending".to_string(),
                    details: "{Paid: false}".to_string(),
                }],
            }],
            edges: vec![EdgeEntryV1 {
                from: 0,
                to: 1,
                machine: "Order".to_string(),
                event_name: "Entry".to_string(),
                handler: Some(0),
            }],
        }
    }

    #[test]
    fn cbor_roundtrip_preserves_document() {
        let doc = sample_doc();
        let mut bytes = alloc::vec::Vec::new();
        ciborium::into_writer(&doc, &mut bytes).unwrap();
        let back: WorldsDocV1 = ciborium::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn encoding_is_stable_for_equal_documents() {
        let mut a = alloc::vec::Vec::new();
        let mut b = alloc::vec::Vec::new();
        ciborium::into_writer(&sample_doc(), &mut a).unwrap();
        ciborium::into_writer(&sample_doc(), &mut b).unwrap();
        assert_eq!(a, b);
    }
}
