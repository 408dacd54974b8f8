// Path: crates/types/src/app/events.rs

use crate::app::Principal;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A unified event type for observable effects of a transaction. Events are
/// collected into the executing transaction's receipt by the ledger, in
/// emission order, and are the primary assertion surface for tests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum ProtocolEvent {
    /// Native currency moved between accounts.
    UstxTransfer {
        /// The transferred amount in uSTX.
        amount: u128,
        /// The debited account.
        from: Principal,
        /// The credited account.
        to: Principal,
    },

    /// CivicCoin tokens moved between accounts.
    TokenTransfer {
        /// The transferred token amount.
        amount: u128,
        /// The debited account.
        from: Principal,
        /// The credited account.
        to: Principal,
    },

    /// New CivicCoin tokens were minted (coinbase payout).
    TokenMint {
        /// The minted token amount.
        amount: u128,
        /// The credited account.
        recipient: Principal,
    },

    /// A caller-supplied memo attached to a mining or registration call.
    Memo(Vec<u8>),

    /// The block window covered by a `mine-many` call.
    BlockRange {
        /// First block mined by the call.
        first_block: u64,
        /// Last block mined by the call.
        last_block: u64,
    },

    /// The cycle window locked by a `stack-tokens` call.
    CycleRange {
        /// First cycle the lock covers.
        first_cycle: u64,
        /// Last cycle the lock covers.
        last_cycle: u64,
    },
}
