// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier and fingerprint types.
use blake3::Hasher;

/// Content-addressed digest of a canonical byte encoding.
///
/// Fingerprints are the first 128 bits of a domain-separated BLAKE3 digest.
/// Equal canonical encodings always produce equal fingerprints; unequal
/// encodings collide only with negligible probability. The explorer still
/// keeps a secondary full-equality guard on fingerprint hits, so a collision
/// is detected and aborts the run instead of silently merging worlds.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fingerprint(pub [u8; 16]);

impl Fingerprint {
    /// Returns the canonical byte representation of this fingerprint.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the fingerprint as a lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Computes a domain-separated fingerprint over `payload`.
pub(crate) fn make_fingerprint(domain: &[u8], payload: &[u8]) -> Fingerprint {
    let mut hasher = Hasher::new();
    hasher.update(domain);
    hasher.update(payload);
    let digest: [u8; 32] = hasher.finalize().into();
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    Fingerprint(out)
}

/// Dense identifier for an explored world.
///
/// Ids are assigned in discovery (BFS) order; the root world is always id 0.
/// They are stable within a single run but may be renumbered across runs —
/// [`Fingerprint`] is the cross-run identity.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldId(u32);

impl WorldId {
    /// The root world's id.
    pub const ROOT: Self = Self(0);

    /// Constructs a `WorldId` from a raw index.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the id as a dense array index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the underlying raw value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for WorldId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Stable identity of a machine within a world: its index in the world's
/// machine array.
///
/// Machines are materialized in spec declaration order, so the index is known
/// at build time and survives world cloning. Cross-machine references are
/// always encoded as a `MachineId`, never as a pointer, which keeps world
/// fingerprints address-independent.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MachineId(u32);

impl MachineId {
    /// Constructs a `MachineId` from a raw index.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the id as a dense array index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the underlying raw value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for MachineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "machine#{}", self.0)
    }
}

/// Identity of a declared state: its index in the machine spec's declared
/// state list.
///
/// Dispatch is keyed by declaration identity, not payload value-equality: two
/// states with equal payloads but distinct declaration positions are distinct
/// states.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateId(u32);

impl StateId {
    /// Constructs a `StateId` from a raw index.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the id as a dense array index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the underlying raw value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}
