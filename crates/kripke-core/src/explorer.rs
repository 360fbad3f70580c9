// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Breadth-first exploration of the world graph.
//!
//! Determinism contract
//! - Worlds are expanded in FIFO (BFS) order; successors are generated with
//!   machines in declaration order and handlers in registration order, so
//!   two runs over identical specs and bounds produce identical graphs:
//!   same fingerprints, same ids, same edges.
//! - The visited set is keyed by fingerprint with a secondary full-equality
//!   guard; a detected collision aborts the run instead of silently merging
//!   unequal worlds.
//! - Bounds cut exploration cleanly: the partial graph is valid for the
//!   explored subset and the stop reason is recorded.
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::checker::CheckError;
use crate::graph::{Edge, Graph};
use crate::ident::WorldId;
use crate::property::{Invariant, ViolationPolicy};
use crate::report::{InvariantViolation, MachineSnapshot};
use crate::spec::MachineSpec;
use crate::world::World;

/// Limits on one exploration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds {
    /// Maximum number of worlds to visit (the root counts).
    pub max_worlds: usize,
    /// Maximum BFS depth to expand. Worlds at this depth are still
    /// discovered and checked, but not expanded.
    pub max_depth: u32,
    /// Wall-clock budget for the whole exploration.
    pub wall_clock: Option<Duration>,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            max_worlds: 100_000,
            max_depth: 10_000,
            wall_clock: None,
        }
    }
}

impl Bounds {
    /// Bounds limited only by world count.
    #[must_use]
    pub fn with_max_worlds(max_worlds: usize) -> Self {
        Self {
            max_worlds,
            ..Self::default()
        }
    }
}

/// Why exploration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The frontier drained: every reachable world within bounds was
    /// expanded.
    Exhausted,
    /// The visited-world bound was hit.
    WorldLimit,
    /// Worlds beyond the depth bound were left unexpanded.
    DepthLimit,
    /// The wall-clock budget ran out.
    WallClock,
    /// Policy stopped exploration at the first invariant violation.
    FirstViolation,
    /// Exploration never ran (configuration errors).
    NotRun,
}

impl StopReason {
    /// Whether this reason marks a bounded (partial) result.
    #[must_use]
    pub fn bounded(self) -> bool {
        matches!(self, Self::WorldLimit | Self::DepthLimit | Self::WallClock)
    }
}

/// A completed exploration: the graph plus the invariant violations found
/// along the way.
pub(crate) struct Exploration {
    pub(crate) graph: Graph,
    pub(crate) invariant_violations: Vec<InvariantViolation>,
}

/// Explores every reachable world from the specs' root configuration.
pub(crate) fn explore(
    specs: &[Arc<MachineSpec>],
    invariants: &[Invariant],
    policy: ViolationPolicy,
    bounds: &Bounds,
) -> Result<Exploration, CheckError> {
    let started = Instant::now();
    let root = World::root(specs);
    let mut graph = Graph::with_root(root);
    let mut violations = Vec::new();
    let mut frontier: VecDeque<WorldId> = VecDeque::new();
    let mut depth_limited = false;

    let root_violations = eval_invariants(&graph, WorldId::ROOT, invariants);
    let root_violated = !root_violations.is_empty();
    violations.extend(root_violations);
    if root_violated && policy == ViolationPolicy::StopOnFirstViolation {
        graph.stop = StopReason::FirstViolation;
        return Ok(Exploration {
            graph,
            invariant_violations: violations,
        });
    }
    frontier.push_back(WorldId::ROOT);

    'expansion: while let Some(id) = frontier.pop_front() {
        if let Some(budget) = bounds.wall_clock {
            if started.elapsed() >= budget {
                graph.stop = StopReason::WallClock;
                break;
            }
        }
        if graph.worlds[id.index()].depth() >= bounds.max_depth {
            depth_limited = true;
            continue;
        }

        let successors = graph.worlds[id.index()].successors()?;
        for (label, successor) in successors {
            let fingerprint = successor.fingerprint();
            if let Some(existing) = graph.world_by_fingerprint(fingerprint) {
                // Secondary guard: fingerprint equality must mean value
                // equality, or the digest has collided.
                if !graph.worlds[existing.index()].value_eq(&successor) {
                    return Err(CheckError::InternalCorruption(
                        "fingerprint collision: equal digests for unequal worlds",
                    ));
                }
                graph.push_edge(Edge {
                    from: id,
                    to: existing,
                    label,
                });
            } else {
                if graph.world_count() >= bounds.max_worlds {
                    graph.stop = StopReason::WorldLimit;
                    break 'expansion;
                }
                let new_id = graph.insert_world(successor, id);
                graph.push_edge(Edge {
                    from: id,
                    to: new_id,
                    label,
                });

                let new_violations = eval_invariants(&graph, new_id, invariants);
                let violated = !new_violations.is_empty();
                violations.extend(new_violations);
                if violated && policy == ViolationPolicy::StopOnFirstViolation {
                    graph.stop = StopReason::FirstViolation;
                    break 'expansion;
                }
                frontier.push_back(new_id);
            }
        }

        #[cfg(feature = "telemetry")]
        if graph.world_count().is_multiple_of(4096) {
            crate::telemetry::progress(graph.world_count(), graph.edge_count(), frontier.len());
        }
    }

    if graph.stop == StopReason::Exhausted && depth_limited {
        graph.stop = StopReason::DepthLimit;
    }

    #[cfg(feature = "telemetry")]
    crate::telemetry::finished(
        graph.stop,
        graph.world_count(),
        graph.edge_count(),
        violations.len(),
    );

    Ok(Exploration {
        graph,
        invariant_violations: violations,
    })
}

/// Evaluates every invariant against a newly discovered world.
fn eval_invariants(
    graph: &Graph,
    id: WorldId,
    invariants: &[Invariant],
) -> Vec<InvariantViolation> {
    let world = &graph.worlds[id.index()];
    invariants
        .iter()
        .filter(|invariant| !invariant.holds(world))
        .map(|invariant| InvariantViolation {
            invariant: invariant.name().to_owned(),
            world: id,
            machines: MachineSnapshot::of_world(world),
        })
        .collect()
}
