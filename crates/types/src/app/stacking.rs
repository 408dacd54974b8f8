// Path: crates/types/src/app/stacking.rs
//! Records for the reward-cycle stacking engine.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// One stacker's cumulative position in one reward cycle.
///
/// Each `stack-tokens` call adds to `amount_stacked` for every cycle in its
/// lock window and adds the principal to `to_return` only for the last
/// cycle of the window.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct StackerCycleRecord {
    /// Tokens counted toward this cycle's stacked total.
    pub amount_stacked: u128,
    /// Token principal returned to the stacker when this cycle is claimed.
    pub to_return: u128,
}

/// Aggregate totals for one reward cycle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode,
)]
pub struct StackingStatsAtCycle {
    /// The uSTX pool accrued from mining commitments during this cycle.
    pub amount_ustx: u128,
    /// Total tokens stacked across all users for this cycle.
    pub amount_token: u128,
}
