// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Invariants and temporal rules.
//!
//! Predicates are pure function pointers over snapshots; they must not
//! perform I/O or depend on anything outside the world handed to them.
use crate::machine::Machine;
use crate::world::World;

/// Predicate over the machines selected by an invariant's scope.
pub type ScopedPredicate = fn(&[&Machine]) -> bool;

/// Predicate over a whole world, used by temporal rules.
pub type WorldPredicate = fn(&World) -> bool;

/// Which machines an invariant's predicate receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every machine in the world, in declaration order.
    All,
    /// A single machine by identity.
    Machine(crate::ident::MachineId),
    /// Every machine whose spec carries this type tag.
    Type(String),
}

impl Scope {
    /// Selects the scoped machines from `world`, in declaration order.
    pub(crate) fn select<'w>(&self, world: &'w World) -> Vec<&'w Machine> {
        match self {
            Self::All => world.machines().iter().collect(),
            Self::Machine(id) => world.machine(*id).into_iter().collect(),
            Self::Type(tag) => world
                .machines()
                .iter()
                .filter(|m| m.type_tag() == tag)
                .collect(),
        }
    }
}

/// A safety property: must hold in every reachable world.
///
/// Invariants are evaluated on each newly discovered world before its
/// successors are computed. A failing world is flagged and exploration
/// continues unless the checker's policy is
/// [`ViolationPolicy::StopOnFirstViolation`].
#[derive(Debug, Clone)]
pub struct Invariant {
    name: String,
    scope: Scope,
    predicate: ScopedPredicate,
}

impl Invariant {
    /// Creates an invariant.
    #[must_use]
    pub fn new(name: impl Into<String>, scope: Scope, predicate: ScopedPredicate) -> Self {
        Self {
            name: name.into(),
            scope,
            predicate,
        }
    }

    /// The invariant's report name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the predicate against `world`'s scoped machines.
    pub(crate) fn holds(&self, world: &World) -> bool {
        let selected = self.scope.select(world);
        (self.predicate)(&selected)
    }
}

/// A response property: whenever `P` holds, `Q` is eventually reachable.
///
/// Satisfied iff every reachable world where `P` holds can reach (along
/// directed edges) some world where `Q` holds. Checked over the completed
/// graph after exploration.
#[derive(Debug, Clone)]
pub struct TemporalRule {
    name: String,
    whenever: WorldPredicate,
    eventually: WorldPredicate,
}

impl TemporalRule {
    /// The rule's report name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `P` predicate.
    pub(crate) fn whenever(&self) -> WorldPredicate {
        self.whenever
    }

    /// The `Q` predicate.
    pub(crate) fn eventually(&self) -> WorldPredicate {
        self.eventually
    }
}

/// Builds the response rule `whenever(P) eventually(Q)`.
#[must_use]
pub fn whenever_eventually(
    name: impl Into<String>,
    whenever: WorldPredicate,
    eventually: WorldPredicate,
) -> TemporalRule {
    TemporalRule {
        name: name.into(),
        whenever,
        eventually,
    }
}

/// What the explorer does when an invariant fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViolationPolicy {
    /// Record the violation and keep exploring (full graph, full counts).
    #[default]
    Continue,
    /// Stop exploration cleanly at the first violating world.
    StopOnFirstViolation,
}
