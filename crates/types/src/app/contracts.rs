// Path: crates/types/src/app/contracts.rs
//! Lifecycle records for deployed core-contract instances.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The lifecycle state of a registered core-contract instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum CoreContractState {
    /// Registered but not yet the authoritative engine.
    Deployed,
    /// The authoritative engine from `start_height` onward.
    Active,
    /// Superseded by an upgrade at `end_height + 1`. Terminal.
    Inactive,
}

/// A registry record for one core-contract instance.
///
/// `start_height` and `end_height` are each set exactly once and never
/// revised; both are zero while unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct CoreContractRecord {
    /// Current lifecycle state.
    pub state: CoreContractState,
    /// First block height at which this instance is authoritative.
    pub start_height: u64,
    /// Last block height at which this instance was authoritative.
    pub end_height: u64,
}

impl CoreContractRecord {
    /// A freshly registered record: `Deployed` with unset heights.
    pub fn deployed() -> Self {
        CoreContractRecord {
            state: CoreContractState::Deployed,
            start_height: 0,
            end_height: 0,
        }
    }
}
