// Path: crates/types/src/context.rs
//! Defines the stable context for transaction execution.

use crate::app::Principal;

/// Provides stable, read-only context to protocol modules during execution.
///
/// Block height is always passed through this context; handlers never read a
/// process-wide clock.
#[derive(Clone, Copy, Debug)]
pub struct TxContext {
    /// The current block height being processed.
    pub block_height: u64,
    /// The principal that submitted the current transaction. This is the
    /// authoritative source for permission checks within modules.
    pub sender: Principal,
}
