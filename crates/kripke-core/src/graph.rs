// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The explored transition graph (a Kripke structure).
//!
//! # Invariants
//! - Fingerprints are one-to-one with world ids; the explorer aborts on a
//!   detected collision rather than merging unequal worlds.
//! - Every world other than the root has at least one incoming edge.
//! - Edges are duplicated only when they arise from distinct
//!   (machine, handler) choices at the source; duplicates are retained so
//!   reports preserve non-determinism branching.
use rustc_hash::FxHashMap;

use crate::event::EventStamp;
use crate::explorer::StopReason;
use crate::ident::{Fingerprint, MachineId, WorldId};
use crate::world::World;

/// The choice that produced a transition: which machine was stepped, which
/// event was delivered, and which handler fired (when one did).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeLabel {
    /// Machine that was stepped.
    pub machine: MachineId,
    /// Event that was delivered (payload dropped).
    pub event: EventStamp,
    /// Registration index of the handler that fired. `None` for system-event
    /// applications and for events that matched no handler.
    pub handler: Option<u32>,
}

/// One directed transition between explored worlds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// Source world.
    pub from: WorldId,
    /// Successor world.
    pub to: WorldId,
    /// The choice that produced this transition.
    pub label: EdgeLabel,
}

/// Directed graph of every world discovered during one exploration.
#[derive(Debug)]
pub struct Graph {
    pub(crate) worlds: Vec<World>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) out: Vec<Vec<usize>>,
    pub(crate) parents: Vec<Option<WorldId>>,
    pub(crate) by_fingerprint: FxHashMap<Fingerprint, WorldId>,
    pub(crate) stop: StopReason,
}

impl Graph {
    pub(crate) fn with_root(root: World) -> Self {
        let mut by_fingerprint = FxHashMap::default();
        by_fingerprint.insert(root.fingerprint(), WorldId::ROOT);
        Self {
            worlds: vec![root],
            edges: Vec::new(),
            out: vec![Vec::new()],
            parents: vec![None],
            by_fingerprint,
            stop: StopReason::Exhausted,
        }
    }

    /// Number of worlds discovered.
    #[must_use]
    pub fn world_count(&self) -> usize {
        self.worlds.len()
    }

    /// Number of edges recorded.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All worlds, densely indexed by [`WorldId`]; the root is first.
    #[must_use]
    pub fn worlds(&self) -> &[World] {
        &self.worlds
    }

    /// Looks up a world by id.
    #[must_use]
    pub fn world(&self, id: WorldId) -> Option<&World> {
        self.worlds.get(id.index())
    }

    /// All edges, in discovery order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Out-edges of `id`, in discovery order.
    pub fn out_edges(&self, id: WorldId) -> impl Iterator<Item = &Edge> {
        self.out
            .get(id.index())
            .into_iter()
            .flatten()
            .filter_map(|&i| self.edges.get(i))
    }

    /// Out-degree of `id`.
    #[must_use]
    pub fn out_degree(&self, id: WorldId) -> usize {
        self.out.get(id.index()).map_or(0, Vec::len)
    }

    /// Looks up a world id by fingerprint.
    #[must_use]
    pub fn world_by_fingerprint(&self, fingerprint: Fingerprint) -> Option<WorldId> {
        self.by_fingerprint.get(&fingerprint).copied()
    }

    /// Ids of terminal worlds (no runnable machine), in id order.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn terminal_worlds(&self) -> Vec<WorldId> {
        self.worlds
            .iter()
            .enumerate()
            .filter(|(_, w)| w.is_terminal())
            .map(|(i, _)| WorldId::from_raw(i as u32))
            .collect()
    }

    /// Why exploration stopped.
    #[must_use]
    pub fn stop(&self) -> StopReason {
        self.stop
    }

    /// Whether the graph is a bounded (partial) result.
    #[must_use]
    pub fn bounded(&self) -> bool {
        self.stop.bounded()
    }

    /// The shortest witness path root → `id`, inclusive, reconstructed from
    /// BFS parent pointers. Empty when `id` is out of range.
    #[must_use]
    pub fn path_from_root(&self, id: WorldId) -> Vec<WorldId> {
        if id.index() >= self.worlds.len() {
            return Vec::new();
        }
        let mut path = vec![id];
        let mut cursor = id;
        while let Some(Some(parent)) = self.parents.get(cursor.index()) {
            path.push(*parent);
            cursor = *parent;
        }
        path.reverse();
        path
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) {
        let from = edge.from.index();
        let index = self.edges.len();
        self.edges.push(edge);
        if let Some(bucket) = self.out.get_mut(from) {
            bucket.push(index);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn insert_world(&mut self, world: World, parent: WorldId) -> WorldId {
        let id = WorldId::from_raw(self.worlds.len() as u32);
        self.by_fingerprint.insert(world.fingerprint(), id);
        self.worlds.push(world);
        self.out.push(Vec::new());
        self.parents.push(Some(parent));
        id
    }
}
