// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical value model for machine fields and event payloads.
//!
//! Determinism contract
//! - Every value has exactly one canonical byte encoding, produced by
//!   [`Value::canonical_bytes`]. Fingerprints and world dedup are defined over
//!   this encoding, so equality under fingerprinting is precisely deep
//!   value-equality modulo machine identity.
//! - Unordered containers are canonicalized structurally: sets encode in
//!   element-sorted order and maps in key-sorted order (`BTreeSet`/`BTreeMap`
//!   iteration order), so insertion order can never leak into a fingerprint.
//! - Floats are identified by IEEE-754 bit pattern. `0.0` and `-0.0` are
//!   distinct values, and NaNs with distinct payloads are distinct values.
//! - Cross-machine references are encoded as the target's [`MachineId`]
//!   (its index in the world's machine array), never as a pointer, which
//!   keeps fingerprints address-independent and lets worlds be deep-copied
//!   freely.
//! - All lengths are 8-byte little-endian; changing widths or endianness
//!   changes every fingerprint and must be treated as a breaking change.
//!
//! The enum is closed, so everything user code can store in a machine field
//! is fingerprintable by construction; there is no runtime
//! "unfingerprintable value" failure mode.
use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;

use crate::domain;
use crate::ident::{make_fingerprint, Fingerprint, MachineId};

const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_UINT: u8 = 0x03;
const TAG_FLOAT: u8 = 0x04;
const TAG_STR: u8 = 0x05;
const TAG_BYTES: u8 = 0x06;
const TAG_LIST: u8 = 0x07;
const TAG_SET: u8 = 0x08;
const TAG_MAP: u8 = 0x09;
const TAG_RECORD: u8 = 0x0a;
const TAG_UNION: u8 = 0x0b;
const TAG_MACHINE_REF: u8 = 0x0c;

/// IEEE-754 double stored by bit pattern.
///
/// Ordering and equality follow the raw bits, which gives floats a total
/// order suitable for `BTreeSet`/`BTreeMap` canonicalization without ever
/// comparing payloads numerically.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatBits(u64);

impl FloatBits {
    /// Captures the bit pattern of `value`.
    #[must_use]
    pub const fn from_f64(value: f64) -> Self {
        Self(value.to_bits())
    }

    /// Reconstructs the float from its bit pattern.
    #[must_use]
    pub const fn to_f64(self) -> f64 {
        f64::from_bits(self.0)
    }

    /// Returns the raw bit pattern.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }
}

/// Named fields in declaration order.
///
/// Declaration order is part of a record's identity: two records with the
/// same fields in different orders are distinct values and encode to
/// distinct canonical bytes. Machine field records inherit their order from
/// the spec's field declarations, so every clone of a machine shares one
/// ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field, builder style. Replaces the value when the name is
    /// already declared.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    /// Returns the value of `name` when present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Writes `name`, replacing an existing field in place or appending a new
    /// one at the end of the declaration order.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Appends the record's canonical encoding (field count, then each
    /// name/value pair in declaration order) to `out`.
    pub(crate) fn canonical_bytes(&self, out: &mut Vec<u8>) {
        write_len(out, self.fields.len());
        for (name, value) in &self.fields {
            write_bytes(out, name.as_bytes());
            value.canonical_bytes(out);
        }
    }
}

impl core::fmt::Display for Record {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// A user-storable value: the full domain of machine fields and event
/// payloads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Unsigned 64-bit integer. Distinct from `Int` even for shared bit
    /// patterns; the canonical encoding tags them differently.
    UInt(u64),
    /// IEEE-754 double identified by bit pattern.
    Float(FloatBits),
    /// UTF-8 string.
    Str(String),
    /// Opaque byte blob.
    Bytes(Bytes),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Unordered set, canonicalized in element-sorted order.
    Set(BTreeSet<Value>),
    /// Unordered map, canonicalized in key-sorted order.
    Map(BTreeMap<Value, Value>),
    /// Named fields in declaration order.
    Record(Record),
    /// Tagged union: discriminator tag plus payload.
    Union {
        /// Discriminator tag.
        tag: String,
        /// Payload carried under the tag.
        payload: Box<Value>,
    },
    /// Reference to another machine, by its index in the world's machine
    /// array.
    MachineRef(MachineId),
}

impl Value {
    /// The empty record, used where a payload is required but carries no
    /// data.
    #[must_use]
    pub const fn unit() -> Self {
        Self::Record(Record::new())
    }

    /// Wraps a float by bit pattern.
    #[must_use]
    pub const fn float(value: f64) -> Self {
        Self::Float(FloatBits::from_f64(value))
    }

    /// Appends this value's canonical encoding to `out`.
    pub fn canonical_bytes(&self, out: &mut Vec<u8>) {
        match self {
            Self::Bool(b) => {
                out.push(TAG_BOOL);
                out.push(u8::from(*b));
            }
            Self::Int(i) => {
                out.push(TAG_INT);
                out.extend_from_slice(&i.to_le_bytes());
            }
            Self::UInt(u) => {
                out.push(TAG_UINT);
                out.extend_from_slice(&u.to_le_bytes());
            }
            Self::Float(bits) => {
                out.push(TAG_FLOAT);
                out.extend_from_slice(&bits.bits().to_le_bytes());
            }
            Self::Str(s) => {
                out.push(TAG_STR);
                write_bytes(out, s.as_bytes());
            }
            Self::Bytes(b) => {
                out.push(TAG_BYTES);
                write_bytes(out, b);
            }
            Self::List(items) => {
                out.push(TAG_LIST);
                write_len(out, items.len());
                for item in items {
                    item.canonical_bytes(out);
                }
            }
            Self::Set(items) => {
                // BTreeSet iterates in sorted order, which is the canonical
                // element order.
                out.push(TAG_SET);
                write_len(out, items.len());
                for item in items {
                    item.canonical_bytes(out);
                }
            }
            Self::Map(entries) => {
                // BTreeMap iterates in key-sorted order, which is the
                // canonical entry order.
                out.push(TAG_MAP);
                write_len(out, entries.len());
                for (key, value) in entries {
                    key.canonical_bytes(out);
                    value.canonical_bytes(out);
                }
            }
            Self::Record(record) => {
                out.push(TAG_RECORD);
                record.canonical_bytes(out);
            }
            Self::Union { tag, payload } => {
                out.push(TAG_UNION);
                write_bytes(out, tag.as_bytes());
                payload.canonical_bytes(out);
            }
            Self::MachineRef(id) => {
                out.push(TAG_MACHINE_REF);
                out.extend_from_slice(&id.value().to_le_bytes());
            }
        }
    }

    /// Fingerprints this value's canonical encoding.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut buf = Vec::new();
        self.canonical_bytes(&mut buf);
        make_fingerprint(domain::VALUE_FINGERPRINT_V1, &buf)
    }
}

fn write_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u64).to_le_bytes());
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_len(out, bytes.len());
    out.extend_from_slice(bytes);
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(bits) => write!(f, "{}", bits.to_f64()),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Set(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Record(record) => write!(f, "{record}"),
            Self::Union { tag, payload } => {
                if matches!(payload.as_ref(), Self::Record(r) if r.is_empty()) {
                    write!(f, "{tag}")
                } else {
                    write!(f, "{tag}({payload})")
                }
            }
            Self::MachineRef(id) => write!(f, "{id}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<MachineId> for Value {
    fn from(value: MachineId) -> Self {
        Self::MachineRef(value)
    }
}
