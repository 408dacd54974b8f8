// Path: crates/services/src/lib.rs
//! The CivicCoin protocol state machine.
//!
//! Each service module is a struct holding its configuration and exposing
//! transaction handlers of the shape
//! `fn op(&self, state, ledger, params, ctx) -> Result<_, TransactionError>`.
//! Handlers validate every precondition before the first write, so a failed
//! call leaves `ProtocolState` untouched; balance movements and event
//! emission go through the [`ledger::LedgerAccess`] seam provided by the
//! embedding chain.

#![forbid(unsafe_code)]

pub mod clock;
pub mod jobs;
pub mod ledger;
pub mod mining;
pub mod registry;
pub mod stacking;
pub mod state;
pub mod users;

pub use ledger::LedgerAccess;
pub use state::ProtocolState;
