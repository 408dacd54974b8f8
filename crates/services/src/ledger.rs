// Path: crates/services/src/ledger.rs
//! The seam between the protocol modules and the embedding chain's balance
//! books. Handlers receive a `&mut dyn LedgerAccess` per call; the chain
//! crate provides the concrete implementation backed by its account books.

use civic_types::app::{Principal, ProtocolEvent};
use civic_types::error::TokenError;

/// Balance movement and event emission, as seen by the protocol modules.
///
/// Successful transfers and mints emit their own `UstxTransfer` /
/// `TokenTransfer` / `TokenMint` events; handlers only emit the print-style
/// events (`Memo`, `BlockRange`, `CycleRange`) themselves.
pub trait LedgerAccess {
    /// Native (uSTX) balance of `who`.
    fn ustx_balance(&self, who: &Principal) -> u128;

    /// CivicCoin token balance of `who`.
    fn token_balance(&self, who: &Principal) -> u128;

    /// Moves native currency. Fails with
    /// [`TokenError::UstxInsufficientBalance`] without emitting.
    fn transfer_ustx(
        &mut self,
        from: &Principal,
        to: &Principal,
        amount: u128,
    ) -> Result<(), TokenError>;

    /// Moves tokens. Fails with [`TokenError::FtInsufficientBalance`]
    /// without emitting.
    fn transfer_token(
        &mut self,
        from: &Principal,
        to: &Principal,
        amount: u128,
    ) -> Result<(), TokenError>;

    /// Mints new tokens to `recipient`.
    fn mint_token(&mut self, recipient: &Principal, amount: u128) -> Result<(), TokenError>;

    /// Appends a print-style event to the executing receipt.
    fn emit(&mut self, event: ProtocolEvent);
}
