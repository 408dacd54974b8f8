// Path: crates/types/src/app/mining.rs
//! Records for the per-block mining engine.

use crate::app::UserId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// One user's native-currency commitment at one block. At most one
/// commitment per (user, block); immutable once written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct MinerCommitment {
    /// The committing user.
    pub user_id: UserId,
    /// The committed amount in uSTX.
    pub amount_ustx: u128,
}
