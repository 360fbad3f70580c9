// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! World-dump document construction and deterministic encoding.
//!
//! The dump is a [`kripke_schema::WorldsDocV1`] encoded as CBOR via
//! `ciborium`. Struct fields serialize in declaration order and worlds/edges
//! are emitted in id/discovery order, so equal graphs encode to identical
//! bytes. JSON is deliberately not offered here: serde_json's output is not
//! canonical and is banned in this crate.
use kripke_schema::{EdgeEntryV1, QueuedEventV1, StateMachineV1, WorldEntryV1, WorldsDocV1};

use crate::checker::CheckError;
use crate::event::Event;
use crate::graph::Graph;
use crate::machine::Machine;
use crate::report::InvariantViolation;
use crate::spec::StateDecl;

/// Builds the v1 dump document from a completed exploration.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn build_doc(graph: &Graph, violations: &[InvariantViolation]) -> WorldsDocV1 {
    let mut flagged = vec![false; graph.world_count()];
    for violation in violations {
        if let Some(slot) = flagged.get_mut(violation.world.index()) {
            *slot = true;
        }
    }

    let worlds = graph
        .worlds()
        .iter()
        .enumerate()
        .map(|(index, world)| {
            let names = world.display_names();
            let queued_events = world
                .machines()
                .iter()
                .zip(&names)
                .flat_map(|(machine, name)| {
                    machine.queue().iter().map(move |event| QueuedEventV1 {
                        event_name: event.name().to_owned(),
                        target_machine: name.clone(),
                        details: event_details(event, machine),
                    })
                })
                .collect();
            let state_machines = world
                .machines()
                .iter()
                .zip(&names)
                .map(|(machine, name)| StateMachineV1 {
                    name: name.clone(),
                    state: machine
                        .state_decl()
                        .map_or_else(|| "?".to_owned(), StateDecl::render),
                    details: if machine.fields().is_empty() {
                        String::new()
                    } else {
                        machine.fields().to_string()
                    },
                })
                .collect();
            WorldEntryV1 {
                id: index as u32,
                invariant_violation: flagged[index],
                queued_events,
                state_machines,
            }
        })
        .collect();

    let edges = graph
        .edges()
        .iter()
        .map(|edge| {
            let machine = graph
                .world(edge.from)
                .and_then(|w| {
                    w.display_names()
                        .into_iter()
                        .nth(edge.label.machine.index())
                })
                .unwrap_or_else(|| edge.label.machine.to_string());
            EdgeEntryV1 {
                from: edge.from.value(),
                to: edge.to.value(),
                machine,
                event_name: edge.label.event.name().to_owned(),
                handler: edge.label.handler,
            }
        })
        .collect();

    WorldsDocV1 {
        version: kripke_schema::WORLDS_DOC_VERSION,
        worlds,
        edges,
    }
}

/// Canonical string rendering of an event's payload fields.
fn event_details(event: &Event, machine: &Machine) -> String {
    match event {
        Event::User(ev) => {
            if matches!(&ev.payload, crate::value::Value::Record(r) if r.is_empty()) {
                String::new()
            } else {
                ev.payload.to_string()
            }
        }
        Event::Transition(target) => machine
            .spec()
            .state(*target)
            .map_or_else(|| "?".to_owned(), |decl| decl.name().to_owned()),
        Event::Entry | Event::Exit | Event::Halt => String::new(),
    }
}

/// Encodes the document as deterministic CBOR.
pub(crate) fn encode_doc(doc: &WorldsDocV1) -> Result<Vec<u8>, CheckError> {
    let mut out = Vec::new();
    ciborium::into_writer(doc, &mut out)
        .map_err(|err| CheckError::DumpEncoding(err.to_string()))?;
    Ok(out)
}
