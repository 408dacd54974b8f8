// Path: crates/chain/src/bank.rs
//! Native (uSTX) and CivicCoin token books, plus the per-transaction event
//! buffer. Implements the service-side ledger seam.

use std::collections::BTreeMap;

use civic_services::ledger::LedgerAccess;
use civic_types::app::{Principal, ProtocolEvent};
use civic_types::error::TokenError;

/// Account books for both assets and the event buffer of the transaction
/// currently executing. Snapshot-cloned per transaction together with the
/// protocol state.
#[derive(Debug, Clone, Default)]
pub struct Bank {
    ustx: BTreeMap<Principal, u128>,
    token: BTreeMap<Principal, u128>,
    events: Vec<ProtocolEvent>,
}

impl Bank {
    /// Credits native currency out of thin air. Test genesis only.
    pub fn credit_ustx(&mut self, who: &Principal, amount: u128) {
        *self.ustx.entry(*who).or_default() += amount;
    }

    /// Credits tokens without an event. Test genesis only.
    pub fn credit_token(&mut self, who: &Principal, amount: u128) {
        *self.token.entry(*who).or_default() += amount;
    }

    /// Takes the events buffered by the current transaction.
    pub(crate) fn drain_events(&mut self) -> Vec<ProtocolEvent> {
        std::mem::take(&mut self.events)
    }

    fn debit(
        book: &mut BTreeMap<Principal, u128>,
        from: &Principal,
        amount: u128,
        err: TokenError,
    ) -> Result<(), TokenError> {
        let balance = book.entry(*from).or_default();
        if *balance < amount {
            return Err(err);
        }
        *balance -= amount;
        Ok(())
    }
}

impl LedgerAccess for Bank {
    fn ustx_balance(&self, who: &Principal) -> u128 {
        self.ustx.get(who).copied().unwrap_or(0)
    }

    fn token_balance(&self, who: &Principal) -> u128 {
        self.token.get(who).copied().unwrap_or(0)
    }

    fn transfer_ustx(
        &mut self,
        from: &Principal,
        to: &Principal,
        amount: u128,
    ) -> Result<(), TokenError> {
        Self::debit(&mut self.ustx, from, amount, TokenError::UstxInsufficientBalance)?;
        *self.ustx.entry(*to).or_default() += amount;
        self.events.push(ProtocolEvent::UstxTransfer {
            amount,
            from: *from,
            to: *to,
        });
        Ok(())
    }

    fn transfer_token(
        &mut self,
        from: &Principal,
        to: &Principal,
        amount: u128,
    ) -> Result<(), TokenError> {
        Self::debit(&mut self.token, from, amount, TokenError::FtInsufficientBalance)?;
        *self.token.entry(*to).or_default() += amount;
        self.events.push(ProtocolEvent::TokenTransfer {
            amount,
            from: *from,
            to: *to,
        });
        Ok(())
    }

    fn mint_token(&mut self, recipient: &Principal, amount: u128) -> Result<(), TokenError> {
        let balance = self.token.entry(*recipient).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;
        self.events.push(ProtocolEvent::TokenMint {
            amount,
            recipient: *recipient,
        });
        Ok(())
    }

    fn emit(&mut self, event: ProtocolEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfers_move_balances_and_emit() {
        let mut bank = Bank::default();
        let a = Principal::from_label("a");
        let b = Principal::from_label("b");
        bank.credit_ustx(&a, 100);

        bank.transfer_ustx(&a, &b, 60).unwrap();
        assert_eq!(bank.ustx_balance(&a), 40);
        assert_eq!(bank.ustx_balance(&b), 60);

        let err = bank.transfer_ustx(&a, &b, 41).unwrap_err();
        assert_eq!(err, TokenError::UstxInsufficientBalance);
        assert_eq!(bank.drain_events().len(), 1);
    }

    #[test]
    fn mints_credit_tokens() {
        let mut bank = Bank::default();
        let a = Principal::from_label("a");
        bank.mint_token(&a, 3_125).unwrap();
        assert_eq!(bank.token_balance(&a), 3_125);
    }
}
