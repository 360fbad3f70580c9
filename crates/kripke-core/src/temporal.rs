// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Temporal rule evaluation over the completed graph.
//!
//! `whenever(P) eventually(Q)` is checked by backward reachability: collect
//! the Q-worlds, flood the reversed edges to find everything that can reach
//! Q, and flag every P-world left outside that set. A terminal P-world that
//! is not itself a Q-world has no path to Q and is caught by the same sweep.
use std::collections::VecDeque;

use crate::graph::Graph;
use crate::ident::WorldId;
use crate::property::TemporalRule;
use crate::report::TemporalViolation;

/// Evaluates one rule, returning a violation (with a shortest root →
/// violator witness path) for every P-world that cannot reach a Q-world.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn check_rule(graph: &Graph, rule: &TemporalRule) -> Vec<TemporalViolation> {
    let world_count = graph.world_count();
    let eventually = rule.eventually();
    let whenever = rule.whenever();

    // Reversed adjacency, built once per rule from the edge list.
    let mut reversed: Vec<Vec<u32>> = vec![Vec::new(); world_count];
    for edge in graph.edges() {
        reversed[edge.to.index()].push(edge.from.value());
    }

    // Backward flood from the Q-set.
    let mut can_reach_q = vec![false; world_count];
    let mut queue = VecDeque::new();
    for (index, world) in graph.worlds().iter().enumerate() {
        if eventually(world) {
            can_reach_q[index] = true;
            queue.push_back(index);
        }
    }
    while let Some(index) = queue.pop_front() {
        for &pred in &reversed[index] {
            let pred = pred as usize;
            if !can_reach_q[pred] {
                can_reach_q[pred] = true;
                queue.push_back(pred);
            }
        }
    }

    graph
        .worlds()
        .iter()
        .enumerate()
        .filter(|(index, world)| whenever(world) && !can_reach_q[*index])
        .map(|(index, _)| {
            let id = WorldId::from_raw(index as u32);
            TemporalViolation {
                rule: rule.name().to_owned(),
                world: id,
                witness: graph.path_from_root(id),
            }
        })
        .collect()
}
