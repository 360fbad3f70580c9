// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use kripke_core::{
    Event, Graph, Machine, MachineId, MachineSpec, MachineSpecBuilder, Mutator, Record, UserEvent,
    Value, World, WorldId,
};

// =============================================================================
// Request/response pair: a server with three alternative Request handlers and
// a client that retries while the response carries Err.
// =============================================================================

pub const SERVER_TAG: &str = "Server";
pub const CLIENT_TAG: &str = "Client";
pub const REQUEST_EVENT: &str = "Request";
pub const RESPONSE_EVENT: &str = "Response";

fn respond(mx: &mut Mutator, ev: &Event, exists: bool, err: bool) {
    let Some(Value::Record(payload)) = ev.payload() else {
        return;
    };
    let Some(Value::MachineRef(client)) = payload.get("client") else {
        return;
    };
    let body = Record::new().field("Exists", exists).field("Err", err);
    mx.send_to(*client, UserEvent::new(RESPONSE_EVENT, Value::Record(body)));
}

fn respond_exists(mx: &mut Mutator, ev: &Event, _m: &Machine) {
    respond(mx, ev, true, false);
}

fn respond_missing(mx: &mut Mutator, ev: &Event, _m: &Machine) {
    respond(mx, ev, false, false);
}

fn respond_error(mx: &mut Mutator, ev: &Event, _m: &Machine) {
    respond(mx, ev, false, true);
}

fn client_entry_idle(mx: &mut Mutator, _ev: &Event, m: &Machine) {
    let Some(Value::MachineRef(server)) = m.field("server") else {
        return;
    };
    let payload = Record::new().field("client", Value::MachineRef(m.id()));
    mx.send_to(*server, UserEvent::new(REQUEST_EVENT, Value::Record(payload)));
    if let Some(waiting) = m.state_id("Waiting") {
        mx.goto(waiting);
    }
}

fn client_on_response(mx: &mut Mutator, ev: &Event, m: &Machine) {
    let Some(Value::Record(payload)) = ev.payload() else {
        return;
    };
    let exists = matches!(payload.get("Exists"), Some(Value::Bool(true)));
    let err = matches!(payload.get("Err"), Some(Value::Bool(true)));
    mx.set("Exists", exists);
    mx.set("Err", err);
    if err {
        if let Some(idle) = m.state_id("Idle") {
            mx.goto(idle);
        }
    }
}

/// Server at some fixed index; stays in Running and answers every Request
/// three different ways (one non-deterministic branch per handler).
pub fn server_spec() -> MachineSpecBuilder {
    MachineSpec::builder(SERVER_TAG)
        .state("Running")
        .on_event("Running", REQUEST_EVENT, respond_exists)
        .on_event("Running", REQUEST_EVENT, respond_missing)
        .on_event("Running", REQUEST_EVENT, respond_error)
}

/// Client that sends a Request on entering Idle, waits, and retries from
/// Idle whenever the response carried Err.
pub fn client_spec(server: MachineId) -> MachineSpecBuilder {
    MachineSpec::builder(CLIENT_TAG)
        .state("Idle")
        .state("Waiting")
        .field("server", Value::MachineRef(server))
        .field("Exists", false)
        .field("Err", false)
        .on_entry("Idle", client_entry_idle)
        .on_event("Waiting", RESPONSE_EVENT, client_on_response)
}

// =============================================================================
// Graph helpers
// =============================================================================

/// First world (in id order) matching the predicate.
pub fn find_world(graph: &Graph, pred: impl Fn(&World) -> bool) -> Option<WorldId> {
    graph
        .worlds()
        .iter()
        .position(|w| pred(w))
        .map(|i| WorldId::from_raw(u32::try_from(i).unwrap()))
}

/// All worlds (in id order) matching the predicate.
pub fn worlds_where(graph: &Graph, pred: impl Fn(&World) -> bool) -> Vec<WorldId> {
    graph
        .worlds()
        .iter()
        .enumerate()
        .filter(|(_, w)| pred(w))
        .map(|(i, _)| WorldId::from_raw(u32::try_from(i).unwrap()))
        .collect()
}

/// Reads an integer field, panicking on absence or type mismatch.
pub fn int_field(machine: &Machine, name: &str) -> i64 {
    match machine.field(name) {
        Some(Value::Int(n)) => *n,
        other => panic!("field {name} is not an Int: {other:?}"),
    }
}

/// Reads a boolean field, panicking on absence or type mismatch.
pub fn bool_field(machine: &Machine, name: &str) -> bool {
    match machine.field(name) {
        Some(Value::Bool(b)) => *b,
        other => panic!("field {name} is not a Bool: {other:?}"),
    }
}
