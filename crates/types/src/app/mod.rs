// Path: crates/types/src/app/mod.rs
//! Core application-level data structures for the CivicCoin protocol.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

mod contracts;
mod events;
mod jobs;
mod mining;
mod stacking;

pub use contracts::{CoreContractRecord, CoreContractState};
pub use events::ProtocolEvent;
pub use jobs::{ArgumentValue, Job, JobArgument, JobStatus};
pub use mining::MinerCommitment;
pub use stacking::{StackerCycleRecord, StackingStatsAtCycle};

/// A sequential, 1-based identifier assigned to each registered user.
pub type UserId = u64;

/// A sequential, 1-based identifier assigned to each governance job.
pub type JobId = u64;

/// The identity of an account or contract instance, as supplied by the
/// ledger with every transaction. Authorization throughout the protocol is
/// by principal equality; there is no signature verification here.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub struct Principal(pub [u8; 32]);

impl Principal {
    /// Derives a principal from a short label by zero-padding it to 32
    /// bytes. Labels longer than 32 bytes are truncated.
    pub fn from_label(label: &str) -> Self {
        let mut bytes = [0u8; 32];
        for (dst, src) in bytes.iter_mut().zip(label.as_bytes()) {
            *dst = *src;
        }
        Principal(bytes)
    }
}

impl AsRef<[u8]> for Principal {
    /// Allows treating the `Principal` as a byte slice.
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Principal {
    /// Allows creating a `Principal` directly from a 32-byte array.
    fn from(bytes: [u8; 32]) -> Self {
        Principal(bytes)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Render the label form when the padding is intact, hex otherwise.
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(32);
        match std::str::from_utf8(&self.0[..end]) {
            Ok(label) if !label.is_empty() => write!(f, "{}", label),
            _ => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}
