// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Domain separation prefixes for hashing.

/// Prefix for canonical world fingerprints.
pub const WORLD_FINGERPRINT_V1: &[u8] = b"kripke:world_fp:v1\0";

/// Prefix for canonical value fingerprints.
pub const VALUE_FINGERPRINT_V1: &[u8] = b"kripke:value_fp:v1\0";
