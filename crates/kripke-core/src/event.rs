// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Event types delivered through per-machine queues.
//!
//! `Entry`, `Exit`, `Transition`, and `Halt` are system events injected by
//! the runtime; `User` events are enqueued by handlers via
//! [`crate::Mutator::send_to`]. Events carry no identity beyond their value:
//! duplicates are permitted and occupy distinct queue positions.
use crate::ident::StateId;
use crate::value::Value;

const KIND_ENTRY: u8 = 1;
const KIND_EXIT: u8 = 2;
const KIND_TRANSITION: u8 = 3;
const KIND_HALT: u8 = 4;
const KIND_USER: u8 = 5;

/// A user-defined event: a named type plus a payload value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserEvent {
    /// Event type name; dispatch matches `OnEvent` registrations by this name.
    pub name: String,
    /// Payload carried to the handler.
    pub payload: Value,
}

impl UserEvent {
    /// Creates a user event.
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// One queued event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// The machine entered its current state.
    Entry,
    /// The machine is about to leave its current state.
    Exit,
    /// Replace the current state with the target and enqueue `Entry` for it.
    /// No handler runs for this event.
    Transition(StateId),
    /// Halt the machine: set the halted flag and clear its queue. No handler
    /// runs for this event.
    Halt,
    /// A user-defined event delivered to `OnEvent` handlers.
    User(UserEvent),
}

impl Event {
    /// Creates a user event in place.
    #[must_use]
    pub fn user(name: impl Into<String>, payload: Value) -> Self {
        Self::User(UserEvent::new(name, payload))
    }

    /// Display name of the event: the system kind, or the user event's type
    /// name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Entry => "Entry",
            Self::Exit => "Exit",
            Self::Transition(_) => "Transition",
            Self::Halt => "Halt",
            Self::User(ev) => &ev.name,
        }
    }

    /// The user payload, when this is a user event.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::User(ev) => Some(&ev.payload),
            _ => None,
        }
    }

    /// Returns `true` for runtime-injected events.
    #[must_use]
    pub fn is_system(&self) -> bool {
        !matches!(self, Self::User(_))
    }

    /// Appends the event's canonical encoding (kind tag first) to `out`.
    pub(crate) fn canonical_bytes(&self, out: &mut Vec<u8>) {
        match self {
            Self::Entry => out.push(KIND_ENTRY),
            Self::Exit => out.push(KIND_EXIT),
            Self::Transition(target) => {
                out.push(KIND_TRANSITION);
                out.extend_from_slice(&target.value().to_le_bytes());
            }
            Self::Halt => out.push(KIND_HALT),
            Self::User(ev) => {
                out.push(KIND_USER);
                out.extend_from_slice(&(ev.name.len() as u64).to_le_bytes());
                out.extend_from_slice(ev.name.as_bytes());
                ev.payload.canonical_bytes(out);
            }
        }
    }
}

/// Lightweight summary of a delivered event, used to label graph edges.
///
/// The payload is dropped; only the kind (and user event name) survives,
/// which is what reports and dumps need to describe a transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventStamp {
    /// An `Entry` delivery.
    Entry,
    /// An `Exit` delivery.
    Exit,
    /// A `Transition` application, with its target state.
    Transition(StateId),
    /// A `Halt` application.
    Halt,
    /// A user event delivery, by type name.
    User(String),
}

impl EventStamp {
    /// Summarizes a queued event.
    #[must_use]
    pub fn of(event: &Event) -> Self {
        match event {
            Event::Entry => Self::Entry,
            Event::Exit => Self::Exit,
            Event::Transition(target) => Self::Transition(*target),
            Event::Halt => Self::Halt,
            Event::User(ev) => Self::User(ev.name.clone()),
        }
    }

    /// Display name, matching [`Event::name`].
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Entry => "Entry",
            Self::Exit => "Exit",
            Self::Transition(_) => "Transition",
            Self::Halt => "Halt",
            Self::User(name) => name,
        }
    }
}

impl core::fmt::Display for EventStamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_are_distinct() {
        let events = [
            Event::Entry,
            Event::Exit,
            Event::Transition(StateId::from_raw(0)),
            Event::Halt,
            Event::user("Ping", Value::unit()),
        ];
        let mut firsts: Vec<u8> = events
            .iter()
            .map(|ev| {
                let mut out = Vec::new();
                ev.canonical_bytes(&mut out);
                out[0]
            })
            .collect();
        firsts.sort_unstable();
        firsts.dedup();
        assert_eq!(firsts.len(), events.len());
    }

    #[test]
    fn user_events_with_distinct_payloads_encode_distinctly() {
        let a = Event::user("Req", Value::Int(1));
        let b = Event::user("Req", Value::Int(2));
        let mut ba = Vec::new();
        let mut bb = Vec::new();
        a.canonical_bytes(&mut ba);
        b.canonical_bytes(&mut bb);
        assert_ne!(ba, bb);
    }

    #[test]
    fn stamp_drops_payload_but_keeps_name() {
        let ev = Event::user("Req", Value::Int(1));
        assert_eq!(EventStamp::of(&ev), EventStamp::User("Req".to_owned()));
        assert_eq!(EventStamp::of(&ev).name(), "Req");
    }
}
