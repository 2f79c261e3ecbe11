//! Record identifiers.
//!
//! `ObjectId` follows the familiar 12-byte document-store layout and is
//! rendered as 24 lowercase hex characters on the wire.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use rand::{rng, Rng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::constants::{OBJECT_ID_COUNTER_MASK, OBJECT_ID_HEX_LENGTH, OBJECT_ID_LENGTH};

/// Fixed-size 12-byte record identifier.
///
/// Memory Layout:
/// - [0..4]  - seconds since the unix epoch, big-endian
/// - [4..9]  - value unique to the generator that produced the id
/// - [9..12] - counter, big-endian
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; OBJECT_ID_LENGTH]);

impl ObjectId {
    /// Seconds since the unix epoch at which the id was generated
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Hex string representation
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OBJECT_ID_HEX_LENGTH {
            return Err("ObjectId must be exactly 24 hex characters");
        }

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| "ObjectId must be hex encoded")?;
        Ok(ObjectId(bytes))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Produces strictly increasing ObjectIds.
///
/// Each generator draws its own unique value and counter seed, so a store
/// owns its generator instead of sharing process-wide state.
#[derive(Debug)]
pub struct ObjectIdGenerator {
    unique: [u8; 5],
    counter: AtomicU32,
}

impl ObjectIdGenerator {
    /// Create a generator with a random unique value and counter seed
    pub fn new() -> Self {
        let mut rng = rng();
        let mut unique = [0u8; 5];
        rng.fill(&mut unique);
        // Leave headroom so the counter does not wrap early in a run
        let seed = rng.random::<u32>() & (OBJECT_ID_COUNTER_MASK >> 1);

        Self {
            unique,
            counter: AtomicU32::new(seed),
        }
    }

    /// Generate the next id
    pub fn next_id(&self) -> ObjectId {
        let seconds = chrono::Utc::now().timestamp().max(0) as u32;
        let count = self.counter.fetch_add(1, Ordering::SeqCst) & OBJECT_ID_COUNTER_MASK;

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.unique);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        ObjectId(bytes)
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
