// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Checker entry points: freeze specs, explore, evaluate properties.
use std::sync::Arc;

use thiserror::Error;

use crate::explorer::{explore, Bounds};
use crate::graph::Graph;
use crate::ident::{MachineId, StateId};
use crate::property::{Invariant, TemporalRule, ViolationPolicy};
use crate::report::{ExplorationStats, Report};
use crate::spec::{MachineSpec, MachineSpecBuilder, SpecErrors};
use crate::temporal;

/// Errors that abort a check.
///
/// Property violations are not errors: they are recorded in the [`Report`].
/// These variants cover configuration failures surfaced by entry points that
/// have no report to carry them, handler contract breaches discovered during
/// successor generation, and internal invariants.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Spec validation failed; exploration did not run.
    #[error("configuration errors: {0}")]
    Config(SpecErrors),
    /// A handler sent an event to a machine index outside the world.
    #[error("{from}: send target out of range: {target}")]
    BadSendTarget {
        /// Machine whose handler issued the send.
        from: MachineId,
        /// The out-of-range target.
        target: MachineId,
    },
    /// A handler requested a transition to a state index outside its spec.
    #[error("{machine}: transition target out of range: state index {}", .target.value())]
    BadTransitionTarget {
        /// Machine whose handler issued the goto.
        machine: MachineId,
        /// The out-of-range state.
        target: StateId,
    },
    /// Internal invariant violated (checker state corruption).
    #[error("internal invariant violated: {0}")]
    InternalCorruption(&'static str),
    /// The world-dump document failed to encode.
    #[error("dump encoding failed: {0}")]
    DumpEncoding(String),
}

/// A frozen check: machine specs plus registered properties and bounds.
///
/// The checker owns no mutable state between runs; every call to
/// [`Checker::check`] (or [`Checker::dump`]) creates fresh exploration
/// bookkeeping and destroys it on return.
#[derive(Debug)]
pub struct Checker {
    specs: Vec<Arc<MachineSpec>>,
    invariants: Vec<Invariant>,
    rules: Vec<TemporalRule>,
    bounds: Bounds,
    policy: ViolationPolicy,
}

impl Checker {
    /// Creates a checker over frozen specs. Machines materialize in the
    /// given order; their [`MachineId`]s are the positions in this list.
    #[must_use]
    pub fn new(specs: Vec<MachineSpec>) -> Self {
        Self {
            specs: specs.into_iter().map(Arc::new).collect(),
            invariants: Vec::new(),
            rules: Vec::new(),
            bounds: Bounds::default(),
            policy: ViolationPolicy::default(),
        }
    }

    /// Registers an invariant.
    #[must_use]
    pub fn invariant(mut self, invariant: Invariant) -> Self {
        self.invariants.push(invariant);
        self
    }

    /// Registers a temporal rule.
    #[must_use]
    pub fn rule(mut self, rule: TemporalRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Replaces the exploration bounds.
    #[must_use]
    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Replaces the invariant violation policy.
    #[must_use]
    pub fn policy(mut self, policy: ViolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs exploration and every registered property check.
    pub fn check(&self) -> Result<Report, CheckError> {
        let exploration = explore(&self.specs, &self.invariants, self.policy, &self.bounds)?;
        let mut temporal_violations = Vec::new();
        for rule in &self.rules {
            temporal_violations.extend(temporal::check_rule(&exploration.graph, rule));
        }
        Ok(Report {
            stats: stats_of(&exploration.graph),
            config_errors: SpecErrors::default(),
            invariant_violations: exploration.invariant_violations,
            temporal_violations,
        })
    }

    /// Runs exploration only and returns the graph, for downstream tooling.
    pub fn graph(&self) -> Result<Graph, CheckError> {
        explore(&self.specs, &self.invariants, self.policy, &self.bounds).map(|e| e.graph)
    }

    /// Runs exploration only and encodes the world-dump blob.
    ///
    /// Registered invariants still run so the dump can flag violating
    /// worlds; temporal rules are skipped.
    pub fn dump(&self) -> Result<Vec<u8>, CheckError> {
        let exploration = explore(&self.specs, &self.invariants, self.policy, &self.bounds)?;
        let doc = crate::dump::build_doc(&exploration.graph, &exploration.invariant_violations);
        crate::dump::encode_doc(&doc)
    }
}

/// Freezes every builder, aggregating configuration errors across machines.
fn freeze_all(builders: Vec<MachineSpecBuilder>) -> Result<Vec<MachineSpec>, SpecErrors> {
    let mut specs = Vec::new();
    let mut errors = Vec::new();
    for builder in builders {
        match builder.freeze() {
            Ok(spec) => specs.push(spec),
            Err(errs) => errors.extend(errs.errors().iter().cloned()),
        }
    }
    if errors.is_empty() {
        Ok(specs)
    } else {
        Err(SpecErrors::new(errors))
    }
}

/// Runs exploration and all property checks over the given machines.
///
/// Configuration errors do not fail the call: they are reported in the
/// returned [`Report`] (with empty statistics) and exploration is skipped.
pub fn check(
    machines: Vec<MachineSpecBuilder>,
    invariants: Vec<Invariant>,
    rules: Vec<TemporalRule>,
    bounds: Bounds,
) -> Result<Report, CheckError> {
    match freeze_all(machines) {
        Ok(specs) => {
            let mut checker = Checker::new(specs).bounds(bounds);
            for invariant in invariants {
                checker = checker.invariant(invariant);
            }
            for rule in rules {
                checker = checker.rule(rule);
            }
            checker.check()
        }
        Err(errors) => Ok(Report::from_config_errors(errors)),
    }
}

/// Runs exploration only and emits the world-dump blob.
///
/// Unlike [`check`], configuration errors fail the call: there is no report
/// to carry them.
pub fn dump(machines: Vec<MachineSpecBuilder>, bounds: Bounds) -> Result<Vec<u8>, CheckError> {
    let specs = freeze_all(machines).map_err(CheckError::Config)?;
    Checker::new(specs).bounds(bounds).dump()
}

fn stats_of(graph: &Graph) -> ExplorationStats {
    ExplorationStats {
        worlds: graph.world_count(),
        edges: graph.edge_count(),
        bounded: graph.bounded(),
        stop: graph.stop(),
    }
}
