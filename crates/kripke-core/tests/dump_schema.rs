// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! World-dump blob: decodes against the v1 schema and is byte-stable across
//! runs.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use kripke_core::demo::{build_shop_checker, ORDER_TAG, SHIPPER_TAG};
use kripke_core::{Invariant, Machine, MachineSpec, Scope, Value};
use kripke_schema::{WorldsDocV1, WORLDS_DOC_VERSION};

fn decode(blob: &[u8]) -> WorldsDocV1 {
    ciborium::from_reader(blob).unwrap()
}

#[test]
fn dump_decodes_against_the_v1_schema() {
    let blob = build_shop_checker().unwrap().dump().unwrap();
    let doc = decode(&blob);

    assert_eq!(doc.version, WORLDS_DOC_VERSION);
    assert!(!doc.worlds.is_empty());
    assert!(!doc.edges.is_empty());

    let root = &doc.worlds[0];
    assert_eq!(root.id, 0);
    assert!(!root.invariant_violation);

    // Machines render in declaration order under their bare type tags.
    let names: Vec<&str> = root.state_machines.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec![ORDER_TAG, SHIPPER_TAG]);
    assert_eq!(root.state_machines[0].state, "Pending");
    assert_eq!(root.state_machines[1].state, "Ready");

    // The root holds exactly one queued Entry per machine.
    assert_eq!(root.queued_events.len(), 2);
    for event in &root.queued_events {
        assert_eq!(event.event_name, "Entry");
        assert!(event.details.is_empty());
    }

    // Ids are dense and every edge endpoint is a known world.
    for (index, world) in doc.worlds.iter().enumerate() {
        assert_eq!(world.id as usize, index);
    }
    for edge in &doc.edges {
        assert!((edge.from as usize) < doc.worlds.len());
        assert!((edge.to as usize) < doc.worlds.len());
    }
}

#[test]
fn dump_bytes_are_stable_across_runs() {
    let checker = build_shop_checker().unwrap();
    let first = checker.dump().unwrap();
    let second = checker.dump().unwrap();
    assert_eq!(first, second);
}

#[test]
fn dump_flags_invariant_violating_worlds() {
    fn never_paid(machines: &[&Machine]) -> bool {
        machines.iter().all(|m| m.state_name() != "Paid")
    }

    let order = kripke_core::demo::order_spec(kripke_core::MachineId::from_raw(1))
        .freeze()
        .unwrap();
    let shipper = kripke_core::demo::shipper_spec().freeze().unwrap();
    let blob = kripke_core::Checker::new(vec![order, shipper])
        .invariant(Invariant::new(
            "order never paid",
            Scope::Type(ORDER_TAG.to_owned()),
            never_paid,
        ))
        .dump()
        .unwrap();
    let doc = decode(&blob);
    assert!(doc.worlds.iter().any(|w| w.invariant_violation));
    assert!(!doc.worlds[0].invariant_violation);
}

#[test]
fn user_event_payloads_render_into_details() {
    fn send_once(mx: &mut kripke_core::Mutator, _ev: &kripke_core::Event, m: &Machine) {
        let payload = kripke_core::Record::new().field("Amount", Value::Int(3));
        mx.send_to(
            m.id(),
            kripke_core::UserEvent::new("Charge", Value::Record(payload)),
        );
    }

    let spec = MachineSpec::builder("Till")
        .state("Open")
        .on_entry("Open", send_once)
        .freeze()
        .unwrap();
    let blob = kripke_core::Checker::new(vec![spec]).dump().unwrap();
    let doc = decode(&blob);
    let charged = doc
        .worlds
        .iter()
        .flat_map(|w| &w.queued_events)
        .find(|e| e.event_name == "Charge")
        .unwrap();
    assert_eq!(charged.target_machine, "Till");
    assert_eq!(charged.details, "{Amount: 3}");
}
