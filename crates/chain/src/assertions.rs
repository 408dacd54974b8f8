// Path: crates/chain/src/assertions.rs
//! Assertion helpers for scenario tests against the local chain.

use civic_types::app::ProtocolEvent;

/// Asserts that a receipt succeeded, printing the error on failure.
#[macro_export]
macro_rules! assert_tx_ok {
    ($receipt:expr) => {
        match &$receipt.result {
            Ok(()) => {}
            Err(e) => panic!("expected success, got {:?}", e),
        }
    };
}

/// Asserts that a receipt failed with the given stable error code.
#[macro_export]
macro_rules! assert_tx_err {
    ($receipt:expr, $code:expr) => {
        match &$receipt.result {
            Ok(()) => panic!("expected error code {}, transaction succeeded", $code),
            Err(e) => {
                let actual = civic_types::error::ErrorCode::code(e);
                assert_eq!(actual, $code, "expected error code {}, got {}", $code, actual);
            }
        }
    };
}

/// Counts transfer-style events in a receipt (everything except the
/// print-style memo/range events).
pub fn transfer_event_count(events: &[ProtocolEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                ProtocolEvent::UstxTransfer { .. }
                    | ProtocolEvent::TokenTransfer { .. }
                    | ProtocolEvent::TokenMint { .. }
            )
        })
        .count()
}
