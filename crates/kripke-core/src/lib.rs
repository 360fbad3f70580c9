// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! kripke-core: bounded explicit-state model checker for communicating state
//! machines.
//!
//! Users describe a distributed design as machines with named states,
//! per-state entry handlers, and per-event handlers; handlers record field
//! writes, sends, transitions, and halts through a [`Mutator`]. The checker
//! enumerates every reachable global configuration ("world") from the root
//! configuration into a transition graph (a Kripke structure), checks
//! [`Invariant`]s on every world and `whenever P eventually Q`
//! [`TemporalRule`]s over the graph, and can emit a deterministic CBOR dump
//! of the explored worlds for downstream visualizers.
//!
//! Non-determinism — which machine runs next, which of several matching
//! handlers fires — is realized by enumeration, not threads: the explorer is
//! single-threaded and deterministic given identical specs and bounds.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

/// Demo machines showcasing checker capabilities (e.g., the shop pair).
pub mod demo;

mod checker;
mod dispatch;
mod domain;
mod dump;
mod event;
mod explorer;
mod graph;
mod ident;
mod machine;
mod mutator;
mod property;
mod queue;
mod report;
mod spec;
mod step;
#[cfg(feature = "telemetry")]
mod telemetry;
mod temporal;
mod value;
mod world;

// Re-exports for stable public API
/// Checker entry points and fatal error taxonomy.
pub use checker::{check, dump, CheckError, Checker};
/// Handler callback type and dispatch triggers.
pub use dispatch::{HandlerFn, Trigger};
/// Event types delivered through per-machine queues.
pub use event::{Event, EventStamp, UserEvent};
/// Exploration bounds and stop reasons.
pub use explorer::{Bounds, StopReason};
/// The explored transition graph and its edges.
pub use graph::{Edge, EdgeLabel, Graph};
/// Identifier and fingerprint types.
pub use ident::{Fingerprint, MachineId, StateId, WorldId};
/// Runtime machine instances (snapshots handed to predicates and handlers).
pub use machine::Machine;
/// The capability object handlers record side effects through.
pub use mutator::Mutator;
/// Invariants, temporal rules, scopes, and the violation policy.
pub use property::{
    whenever_eventually, Invariant, Scope, ScopedPredicate, TemporalRule, ViolationPolicy,
    WorldPredicate,
};
/// Per-machine FIFO event queue.
pub use queue::EventQueue;
/// Check results: statistics and property violations.
pub use report::{
    ExplorationStats, InvariantViolation, MachineSnapshot, Report, TemporalViolation,
};
/// Machine specifications and configuration errors.
pub use spec::{MachineSpec, MachineSpecBuilder, SpecError, SpecErrors, StateDecl};
/// Canonical value model for fields and payloads.
pub use value::{FloatBits, Record, Value};
/// Immutable world snapshots.
pub use world::World;
