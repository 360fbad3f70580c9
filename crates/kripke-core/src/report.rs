// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Check results: exploration statistics and property violations.
use crate::explorer::StopReason;
use crate::ident::WorldId;
use crate::spec::SpecErrors;
use crate::world::World;

/// Headline numbers for one exploration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplorationStats {
    /// Worlds discovered (including the root).
    pub worlds: usize,
    /// Edges recorded.
    pub edges: usize,
    /// Whether a bound (world count, depth, wall clock) cut exploration
    /// short. A bounded report is still valid for the explored subset.
    pub bounded: bool,
    /// Why exploration stopped.
    pub stop: StopReason,
}

/// Rendered snapshot of one machine, carried by invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MachineSnapshot {
    /// Display name of the machine.
    pub name: String,
    /// Canonical rendering of the current state.
    pub state: String,
    /// Canonical rendering of the machine's user fields.
    pub details: String,
}

impl MachineSnapshot {
    /// Renders every machine of `world`, in declaration order.
    #[must_use]
    pub fn of_world(world: &World) -> Vec<Self> {
        let names = world.display_names();
        world
            .machines()
            .iter()
            .zip(names)
            .map(|(machine, name)| Self {
                name,
                state: machine
                    .state_decl()
                    .map_or_else(|| "?".to_owned(), crate::spec::StateDecl::render),
                details: if machine.fields().is_empty() {
                    String::new()
                } else {
                    machine.fields().to_string()
                },
            })
            .collect()
    }
}

/// One invariant failure, with the offending world's machine snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvariantViolation {
    /// Name of the failed invariant.
    pub invariant: String,
    /// The world it failed on.
    pub world: WorldId,
    /// Snapshot of every machine in that world.
    pub machines: Vec<MachineSnapshot>,
}

/// One temporal rule failure, with a shortest witness path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemporalViolation {
    /// Name of the violated rule.
    pub rule: String,
    /// A P-world that cannot reach any Q-world.
    pub world: WorldId,
    /// Shortest path root → violator, inclusive.
    pub witness: Vec<WorldId>,
}

/// The final result of a check, in report order: statistics, configuration
/// errors (if any — in which case exploration did not run), invariant
/// violations, temporal violations.
#[derive(Debug, Clone)]
pub struct Report {
    /// Exploration statistics.
    pub stats: ExplorationStats,
    /// Aggregated configuration errors. Non-empty means exploration did not
    /// run.
    pub config_errors: SpecErrors,
    /// Invariant violations, in discovery order.
    pub invariant_violations: Vec<InvariantViolation>,
    /// Temporal violations, in rule registration order.
    pub temporal_violations: Vec<TemporalViolation>,
}

impl Report {
    /// A report for a check that failed configuration validation.
    pub(crate) fn from_config_errors(errors: SpecErrors) -> Self {
        Self {
            stats: ExplorationStats {
                worlds: 0,
                edges: 0,
                bounded: false,
                stop: StopReason::NotRun,
            },
            config_errors: errors,
            invariant_violations: Vec::new(),
            temporal_violations: Vec::new(),
        }
    }

    /// `true` when configuration was valid and no property was violated.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.config_errors.is_empty()
            && self.invariant_violations.is_empty()
            && self.temporal_violations.is_empty()
    }
}
