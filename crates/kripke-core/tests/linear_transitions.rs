// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Linear transition chain: A → B → C with an invariant that starts failing
//! mid-chain.
//!
//! The machine increments `Mut` in each state's entry handler. Because Exit
//! and Transition are deferred as events, the chain visits exactly eight
//! worlds, and the `Mut <= 1` invariant first fails on the post-handler,
//! pre-Transition world where `Mut` becomes 2 — then on every later world.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::int_field;
use kripke_core::{
    Bounds, Event, Invariant, Machine, MachineSpec, MachineSpecBuilder, Mutator, Scope, Value,
    WorldId,
};

fn entry_a(mx: &mut Mutator, _ev: &Event, m: &Machine) {
    mx.set("Mut", 1i64);
    if let Some(b) = m.state_id("B") {
        mx.goto(b);
    }
}

fn entry_b(mx: &mut Mutator, _ev: &Event, m: &Machine) {
    mx.set("Mut", 2i64);
    if let Some(c) = m.state_id("C") {
        mx.goto(c);
    }
}

fn entry_c(mx: &mut Mutator, _ev: &Event, _m: &Machine) {
    mx.set("Mut", 3i64);
}

fn chain_spec() -> MachineSpecBuilder {
    MachineSpec::builder("Chain")
        .state("A")
        .state("B")
        .state("C")
        .field("Mut", 0i64)
        .on_entry("A", entry_a)
        .on_entry("B", entry_b)
        .on_entry("C", entry_c)
}

fn mut_le_one(machines: &[&Machine]) -> bool {
    machines.iter().all(|m| int_field(m, "Mut") <= 1)
}

fn checker() -> kripke_core::Checker {
    kripke_core::Checker::new(vec![chain_spec().freeze().unwrap()])
        .invariant(Invariant::new("Mut <= 1", Scope::All, mut_le_one))
}

#[test]
fn chain_visits_exactly_eight_worlds() {
    let report = checker().check().unwrap();
    assert_eq!(report.stats.worlds, 8);
    assert_eq!(report.stats.edges, 7);
    assert!(!report.stats.bounded);
}

#[test]
fn violation_first_flags_the_post_handler_pre_transition_world() {
    let report = checker().check().unwrap();
    // Mut becomes 2 in w4 and never drops back below it.
    assert_eq!(report.invariant_violations.len(), 4);
    let first = &report.invariant_violations[0];
    assert_eq!(first.world, WorldId::from_raw(4));
    assert_eq!(first.machines.len(), 1);
    assert_eq!(first.machines[0].state, "B");
    assert_eq!(first.machines[0].details, "{Mut: 2}");

    let flagged: Vec<u32> = report
        .invariant_violations
        .iter()
        .map(|v| v.world.value())
        .collect();
    assert_eq!(flagged, vec![4, 5, 6, 7]);
}

#[test]
fn first_violating_world_still_awaits_its_transition() {
    let graph = checker().graph().unwrap();
    let world = graph.world(WorldId::from_raw(4)).unwrap();
    let machine = &world.machines()[0];
    assert_eq!(machine.field("Mut"), Some(&Value::Int(2)));
    let queued: Vec<&Event> = machine.queue().iter().collect();
    assert_eq!(queued.len(), 2);
    assert_eq!(queued[0], &Event::Exit);
    assert!(matches!(queued[1], Event::Transition(_)));
}

#[test]
fn terminal_world_rests_in_c_with_mut_three() {
    let graph = checker().graph().unwrap();
    let terminals = graph.terminal_worlds();
    assert_eq!(terminals.len(), 1);
    let world = graph.world(terminals[0]).unwrap();
    let machine = &world.machines()[0];
    assert_eq!(machine.state_name(), "C");
    assert_eq!(machine.field("Mut"), Some(&Value::Int(3)));
    assert!(machine.queue().is_empty());
}

#[test]
fn stop_on_first_violation_halts_at_the_first_flagged_world() {
    let report = checker()
        .policy(kripke_core::ViolationPolicy::StopOnFirstViolation)
        .bounds(Bounds::default())
        .check()
        .unwrap();
    assert_eq!(report.invariant_violations.len(), 1);
    assert_eq!(report.stats.worlds, 5);
    assert_eq!(report.stats.stop, kripke_core::StopReason::FirstViolation);
}
