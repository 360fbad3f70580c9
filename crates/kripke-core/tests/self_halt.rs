// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Halt absorption: a handler that halts and then requests a transition in
//! the same invocation never transitions, and the halted machine stays
//! halted with an empty queue in every reachable world.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use kripke_core::{Event, Machine, MachineSpec, MachineSpecBuilder, Mutator, Value};

fn halt_then_goto(mx: &mut Mutator, _ev: &Event, m: &Machine) {
    mx.halt();
    if let Some(b) = m.state_id("B") {
        mx.goto(b);
    }
}

fn entry_b(mx: &mut Mutator, _ev: &Event, _m: &Machine) {
    mx.set("EnteredB", true);
}

fn halting_spec() -> MachineSpecBuilder {
    MachineSpec::builder("Quitter")
        .state("A")
        .state("B")
        .field("EnteredB", false)
        .on_entry("A", halt_then_goto)
        .on_entry("B", entry_b)
}

#[test]
fn halt_absorbs_before_the_transition_executes() {
    let checker = kripke_core::Checker::new(vec![halting_spec().freeze().unwrap()]);
    let report = checker.check().unwrap();
    assert_eq!(report.stats.worlds, 3);
    assert_eq!(report.stats.edges, 2);
    assert!(report.passed());
}

#[test]
fn terminal_world_halts_in_a_with_an_empty_queue() {
    let checker = kripke_core::Checker::new(vec![halting_spec().freeze().unwrap()]);
    let graph = checker.graph().unwrap();
    let terminals = graph.terminal_worlds();
    assert_eq!(terminals.len(), 1);
    let machine = &graph.world(terminals[0]).unwrap().machines()[0];
    assert!(machine.halted());
    assert!(machine.queue().is_empty());
    assert_eq!(machine.state_name(), "A");
}

#[test]
fn on_entry_b_is_never_observed() {
    let checker = kripke_core::Checker::new(vec![halting_spec().freeze().unwrap()]);
    let graph = checker.graph().unwrap();
    for world in graph.worlds() {
        let machine = &world.machines()[0];
        assert_eq!(machine.field("EnteredB"), Some(&Value::Bool(false)));
        assert_ne!(machine.state_name(), "B");
    }
}

#[test]
fn halted_machines_stay_halted_in_every_successor() {
    let checker = kripke_core::Checker::new(vec![halting_spec().freeze().unwrap()]);
    let graph = checker.graph().unwrap();
    for edge in graph.edges() {
        let before = &graph.world(edge.from).unwrap().machines()[0];
        let after = &graph.world(edge.to).unwrap().machines()[0];
        if before.halted() {
            assert!(after.halted());
            assert!(after.queue().is_empty());
        }
    }
}
