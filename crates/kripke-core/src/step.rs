// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Single-step successor generation: the operational heart of the checker.
//!
//! For a world `W`, every machine that is not halted and has a pending event
//! contributes successors for its queue-head event:
//! - `Entry`/`Exit`/`User` events dispatch to registered handlers; each
//!   eligible handler is an independent non-deterministic branch producing
//!   one successor. When no handler matches, the event is silently discarded
//!   and the pop alone is the successor (under-specification is a modeling
//!   tool, not an error).
//! - `Transition(t)` applies inline: replace the current state with `t` and
//!   enqueue `Entry`. No handler runs.
//! - `Halt` applies inline: set the halted flag and clear the queue. No
//!   handler runs.
//!
//! Exit and Transition are deferred as events rather than applied inside the
//! handler so that every observable side effect is a separately
//! interleavable step: after a machine sends, other machines may run before
//! it actually changes state.
//!
//! Tie-break order is fixed for reproducibility: machines in declaration
//! order, handlers in registration order.
use crate::checker::CheckError;
use crate::dispatch::Trigger;
use crate::event::{Event, EventStamp};
use crate::graph::EdgeLabel;
use crate::ident::MachineId;
use crate::machine::Machine;
use crate::mutator::Mutator;
use crate::world::World;

/// Enumerates every legal one-step successor of `world`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn successors(world: &World) -> Result<Vec<(EdgeLabel, World)>, CheckError> {
    let mut out = Vec::new();

    for (index, machine) in world.machines().iter().enumerate() {
        if machine.halted() {
            continue;
        }
        let Some(event) = machine.queue().peek() else {
            continue;
        };
        let mid = MachineId::from_raw(index as u32);
        let stamp = EventStamp::of(event);

        match event {
            Event::Transition(target) => {
                let mut machines = world.machines().to_vec();
                let stepped = &mut machines[index];
                let _ = stepped.queue_mut().pop();
                if stepped.spec().state(*target).is_none() {
                    return Err(CheckError::BadTransitionTarget {
                        machine: mid,
                        target: *target,
                    });
                }
                stepped.set_state(*target);
                stepped.queue_mut().push(Event::Entry);
                out.push((
                    EdgeLabel {
                        machine: mid,
                        event: stamp,
                        handler: None,
                    },
                    World::from_machines(machines, world.depth() + 1),
                ));
            }
            Event::Halt => {
                let mut machines = world.machines().to_vec();
                machines[index].set_halted();
                out.push((
                    EdgeLabel {
                        machine: mid,
                        event: stamp,
                        handler: None,
                    },
                    World::from_machines(machines, world.depth() + 1),
                ));
            }
            Event::Entry | Event::Exit | Event::User(_) => {
                let trigger = match event {
                    Event::Entry => Trigger::OnEntry,
                    Event::Exit => Trigger::OnExit,
                    Event::User(ev) => Trigger::OnEvent(ev.name.clone()),
                    Event::Transition(_) | Event::Halt => unreachable!(),
                };
                let handlers = machine.spec().handlers(machine.state(), &trigger);

                if handlers.is_empty() {
                    // No handler fires; the event is dropped and the pop
                    // alone is the successor.
                    let mut machines = world.machines().to_vec();
                    let _ = machines[index].queue_mut().pop();
                    out.push((
                        EdgeLabel {
                            machine: mid,
                            event: stamp,
                            handler: None,
                        },
                        World::from_machines(machines, world.depth() + 1),
                    ));
                } else {
                    for (hi, handler) in handlers.iter().enumerate() {
                        let mut machines = world.machines().to_vec();
                        let _ = machines[index].queue_mut().pop();
                        let mut mutator = Mutator::new();
                        handler(&mut mutator, event, &machines[index]);
                        commit(mutator, &mut machines, index)?;
                        out.push((
                            EdgeLabel {
                                machine: mid,
                                event: stamp.clone(),
                                handler: Some(hi as u32),
                            },
                            World::from_machines(machines, world.depth() + 1),
                        ));
                    }
                }
            }
        }
    }

    Ok(out)
}

/// Applies one handler's recorded operations to the successor's machines.
#[allow(clippy::cast_possible_truncation)]
fn commit(mutator: Mutator, machines: &mut [Machine], index: usize) -> Result<(), CheckError> {
    let mid = MachineId::from_raw(index as u32);

    for (name, value) in mutator.writes {
        machines[index].set_field(name, value);
    }

    for (target, event) in mutator.sends {
        let Some(receiver) = machines.get_mut(target.index()) else {
            return Err(CheckError::BadSendTarget { from: mid, target });
        };
        // Sends to halted machines are dropped: halt absorption keeps their
        // queues empty forever.
        if !receiver.halted() {
            receiver.queue_mut().push(Event::User(event));
        }
    }

    if mutator.halt_requested {
        machines[index].queue_mut().push(Event::Halt);
    } else if let Some(target) = mutator.goto_target {
        if machines[index].spec().state(target).is_none() {
            return Err(CheckError::BadTransitionTarget {
                machine: mid,
                target,
            });
        }
        machines[index].queue_mut().push(Event::Exit);
        machines[index].queue_mut().push(Event::Transition(target));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::spec::MachineSpec;
    use crate::value::Value;
    use std::sync::Arc;

    fn set_and_go(mx: &mut Mutator, _ev: &Event, m: &Machine) {
        mx.set("Mut", 1i64);
        if let Some(b) = m.state_id("B") {
            mx.goto(b);
        }
    }

    fn halt_then_goto(mx: &mut Mutator, _ev: &Event, m: &Machine) {
        mx.halt();
        if let Some(b) = m.state_id("B") {
            mx.goto(b);
        }
    }

    fn two_state_spec(handler: crate::dispatch::HandlerFn) -> Arc<MachineSpec> {
        Arc::new(
            MachineSpec::builder("M")
                .state("A")
                .state("B")
                .field("Mut", 0i64)
                .on_entry("A", handler)
                .freeze()
                .unwrap(),
        )
    }

    #[test]
    fn goto_defers_exit_then_transition_at_the_tail() {
        let world = World::root(&[two_state_spec(set_and_go)]);
        let succs = world.successors().unwrap();
        assert_eq!(succs.len(), 1);
        let (label, next) = &succs[0];
        assert_eq!(label.handler, Some(0));
        let machine = &next.machines()[0];
        assert_eq!(machine.field("Mut"), Some(&Value::Int(1)));
        assert_eq!(machine.state_name(), "A");
        let queued: Vec<&Event> = machine.queue().iter().collect();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0], &Event::Exit);
        assert!(matches!(queued[1], Event::Transition(_)));
    }

    #[test]
    fn halt_wins_over_goto() {
        let world = World::root(&[two_state_spec(halt_then_goto)]);
        let succs = world.successors().unwrap();
        assert_eq!(succs.len(), 1);
        let machine = &succs[0].1.machines()[0];
        let queued: Vec<&Event> = machine.queue().iter().collect();
        assert_eq!(queued, vec![&Event::Halt]);
    }

    #[test]
    fn transition_applies_inline_and_reenters() {
        let world = World::root(&[two_state_spec(set_and_go)]);
        // Entry -> handler; Exit (no handler, dropped); Transition applies.
        let after_entry = world.successors().unwrap().remove(0).1;
        let after_exit = after_entry.successors().unwrap().remove(0).1;
        let (label, after_transition) = after_exit.successors().unwrap().remove(0);
        assert_eq!(label.handler, None);
        let machine = &after_transition.machines()[0];
        assert_eq!(machine.state_name(), "B");
        assert_eq!(machine.queue().peek(), Some(&Event::Entry));
    }

    #[test]
    fn halt_event_absorbs_the_whole_queue() {
        let world = World::root(&[two_state_spec(halt_then_goto)]);
        let pending_halt = world.successors().unwrap().remove(0).1;
        let (label, halted) = pending_halt.successors().unwrap().remove(0);
        assert_eq!(label.event, EventStamp::Halt);
        let machine = &halted.machines()[0];
        assert!(machine.halted());
        assert!(machine.queue().is_empty());
        assert!(halted.is_terminal());
    }

    #[test]
    fn terminal_world_has_no_successors() {
        let spec = Arc::new(MachineSpec::builder("Lone").state("Only").freeze().unwrap());
        let world = World::root(&[spec]);
        let drained = world.successors().unwrap().remove(0).1;
        assert!(drained.is_terminal());
        assert!(drained.successors().unwrap().is_empty());
    }
}
