// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The capability object handlers use to record side effects.
//!
//! A handler never mutates the world directly: it records operations against
//! a fresh `Mutator`, and the runtime commits the net effect into the
//! successor world after the handler returns. This keeps each handler
//! invocation a single atomic step and makes every observable side effect a
//! separately-interleavable event.
//!
//! Commit order
//! - Field writes apply to the stepped machine in call order.
//! - Sends enqueue on their targets in call order (FIFO per target).
//! - Then exactly one of the transition intents applies at the machine's own
//!   queue tail: `halt()` wins over `goto()` (the goto is dropped); a lone
//!   `goto(t)` enqueues `Exit` then `Transition(t)`; a lone `halt()`
//!   enqueues `Halt`.
use crate::event::UserEvent;
use crate::ident::{MachineId, StateId};
use crate::value::Value;

/// Records the side effects of one handler invocation.
#[derive(Debug, Default)]
pub struct Mutator {
    pub(crate) writes: Vec<(String, Value)>,
    pub(crate) sends: Vec<(MachineId, UserEvent)>,
    pub(crate) goto_target: Option<StateId>,
    pub(crate) halt_requested: bool,
}

impl Mutator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a field write on the stepped machine.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.writes.push((name.into(), value.into()));
    }

    /// Records a user event send to `target`'s queue.
    ///
    /// Sends to a machine that has already halted are dropped at commit
    /// time; a halted machine's queue stays empty forever.
    pub fn send_to(&mut self, target: MachineId, event: UserEvent) {
        self.sends.push((target, event));
    }

    /// Requests a transition to `target` once the handler commits.
    ///
    /// Calling `goto` again replaces the previous target (last call wins).
    /// If [`Mutator::halt`] is also called in the same invocation, the halt
    /// wins and the goto is dropped.
    pub fn goto(&mut self, target: StateId) {
        self.goto_target = Some(target);
    }

    /// Requests that the machine halt once the handler commits. Idempotent;
    /// shadows any `goto` from the same invocation.
    pub fn halt(&mut self) {
        self.halt_requested = true;
    }
}
