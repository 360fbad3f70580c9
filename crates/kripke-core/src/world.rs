// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Immutable world snapshots.
//!
//! Determinism contract
//! - A world's fingerprint is a domain-separated BLAKE3 digest (truncated to
//!   128 bits) over its canonical byte stream: the machine count followed by
//!   each machine's canonical bytes in declaration order. Machine order,
//!   state indices, field values, queue contents, and halted flags are all
//!   bound into the stream; nothing else is.
//! - Worlds are immutable once constructed. Successors are newly allocated
//!   by the step function and never share mutable state with their parent.
use std::sync::Arc;

use crate::domain;
use crate::event::Event;
use crate::graph::EdgeLabel;
use crate::ident::{make_fingerprint, Fingerprint, MachineId};
use crate::machine::Machine;
use crate::spec::MachineSpec;
use crate::step;

/// Immutable snapshot of all machines at one point in exploration.
#[derive(Debug, Clone)]
pub struct World {
    machines: Vec<Machine>,
    fingerprint: Fingerprint,
    depth: u32,
}

impl World {
    /// Materializes the root world: one instance per spec in declaration
    /// order, each in its initial state with exactly one `Entry` event
    /// enqueued.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn root(specs: &[Arc<MachineSpec>]) -> Self {
        let mut machines: Vec<Machine> = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| Machine::materialize(Arc::clone(spec), MachineId::from_raw(i as u32)))
            .collect();
        for machine in &mut machines {
            machine.queue_mut().push(Event::Entry);
        }
        Self::from_machines(machines, 0)
    }

    /// Finalizes a world from its machines, computing the fingerprint.
    pub(crate) fn from_machines(machines: Vec<Machine>, depth: u32) -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(machines.len() as u64).to_le_bytes());
        for machine in &machines {
            machine.canonical_bytes(&mut buf);
        }
        let fingerprint = make_fingerprint(domain::WORLD_FINGERPRINT_V1, &buf);
        Self {
            machines,
            fingerprint,
            depth,
        }
    }

    /// All machines, in declaration order.
    #[must_use]
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Looks up a machine by identity.
    #[must_use]
    pub fn machine(&self, id: MachineId) -> Option<&Machine> {
        self.machines.get(id.index())
    }

    /// The world's cached fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Steps from the root world (root is 0).
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// A world is terminal when no machine is runnable: every machine is
    /// halted or has an empty queue.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.machines
            .iter()
            .all(|m| m.halted() || m.queue().is_empty())
    }

    /// Enumerates every legal one-step successor, with the choice that
    /// produced it: machines in declaration order, handlers in registration
    /// order.
    pub fn successors(&self) -> Result<Vec<(EdgeLabel, World)>, crate::checker::CheckError> {
        step::successors(self)
    }

    /// Recomputes the canonical byte stream (for fingerprint soundness
    /// checks and tests).
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(self.machines.len() as u64).to_le_bytes());
        for machine in &self.machines {
            machine.canonical_bytes(&mut buf);
        }
        buf
    }

    /// Deep value equality over machine content, ignoring depth. This is the
    /// secondary guard behind fingerprint equality in the visited set.
    pub(crate) fn value_eq(&self, other: &Self) -> bool {
        self.machines == other.machines
    }

    /// Display names for the machines: the bare type tag when unique in this
    /// world, otherwise `tag#index`.
    #[must_use]
    pub fn display_names(&self) -> Vec<String> {
        self.machines
            .iter()
            .map(|m| {
                let tag = m.type_tag();
                let shared = self
                    .machines
                    .iter()
                    .filter(|other| other.type_tag() == tag)
                    .count()
                    > 1;
                if shared {
                    format!("{tag}#{}", m.id().value())
                } else {
                    tag.to_owned()
                }
            })
            .collect()
    }
}
