// Path: crates/services/src/stacking/mod.rs
//! The stacking engine: token locks across reward cycle windows and
//! proportional claims on each cycle's uSTX pool.

use civic_types::app::{Principal, ProtocolEvent, StackerCycleRecord, UserId};
use civic_types::context::TxContext;
use civic_types::error::{EngineError, TransactionError};
use civic_types::service_configs::EngineConfig;
use parity_scale_codec::{Decode, Encode};

use crate::clock::RewardClock;
use crate::ledger::LedgerAccess;
use crate::state::{EngineState, ProtocolState};

/// Parameters for `stack-tokens`.
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct StackTokensParams {
    /// Tokens to lock. Must be nonzero.
    pub amount_token: u128,
    /// Number of consecutive cycles to lock for, `1..=max_lock_period`.
    pub lock_period: u64,
}

/// Parameters for `claim-stacking-reward`.
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct ClaimStackingRewardParams {
    /// The fully elapsed cycle being claimed.
    pub target_cycle: u64,
}

/// The stacking engine service.
pub struct StackingModule {
    config: EngineConfig,
}

impl StackingModule {
    /// Creates the module with its deployment configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    fn clock(&self, state: &EngineState, ctx: &TxContext) -> Result<RewardClock, TransactionError> {
        match state.activation_height {
            Some(h) if ctx.block_height >= h => Ok(RewardClock {
                activation_height: h,
                cycle_length: self.config.reward_cycle_length,
            }),
            _ => Err(EngineError::StackingNotAvailable.into()),
        }
    }

    /// Locks tokens for a window of upcoming cycles, starting one offset
    /// after the current cycle. The principal returns with the last cycle
    /// of the window.
    pub fn stack_tokens(
        &self,
        state: &mut ProtocolState,
        ledger: &mut dyn LedgerAccess,
        params: StackTokensParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        let clock = self.clock(&state.engine, ctx)?;
        if params.amount_token == 0
            || params.lock_period == 0
            || params.lock_period > self.config.max_lock_period
        {
            return Err(EngineError::CannotStack.into());
        }
        if ledger.token_balance(&ctx.sender) < params.amount_token {
            return Err(EngineError::InsufficientBalance.into());
        }

        let current_cycle = clock
            .reward_cycle(ctx.block_height)
            .ok_or(EngineError::StackingNotAvailable)?;
        let first_cycle = current_cycle + self.config.reward_cycle_offset;
        let last_cycle = first_cycle + params.lock_period - 1;
        let user_id = state.engine.get_or_create_user_id(ctx.sender);

        let treasury = state.engine.treasury;
        ledger.transfer_token(&ctx.sender, &treasury, params.amount_token)?;
        for cycle in first_cycle..=last_cycle {
            let record = state
                .engine
                .stackers
                .entry((cycle, user_id))
                .or_insert_with(StackerCycleRecord::default);
            record.amount_stacked += params.amount_token;
            if cycle == last_cycle {
                record.to_return += params.amount_token;
            }
            state.engine.cycle_stats.entry(cycle).or_default().amount_token += params.amount_token;
        }
        ledger.emit(ProtocolEvent::CycleRange {
            first_cycle,
            last_cycle,
        });
        log::debug!(
            "[Stacking] User {} locked {} tokens for cycles {}..={}",
            user_id,
            params.amount_token,
            first_cycle,
            last_cycle
        );
        Ok(())
    }

    /// Claims the sender's entitlement for a fully elapsed cycle: the
    /// proportional uSTX pool share, plus the locked tokens if the cycle
    /// closed the lock window. The record is consumed.
    pub fn claim_stacking_reward(
        &self,
        state: &mut ProtocolState,
        ledger: &mut dyn LedgerAccess,
        params: ClaimStackingRewardParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        let clock = self.clock(&state.engine, ctx)?;
        let user_id = state
            .engine
            .user_id(&ctx.sender)
            .ok_or(EngineError::UserIdNotFound)?;
        if !clock.cycle_fully_elapsed(params.target_cycle, ctx.block_height) {
            return Err(EngineError::RewardCycleNotCompleted.into());
        }
        let record = state.engine.stacker_at_cycle_or_default(params.target_cycle, user_id);
        let entitlement = self.entitlement(&state.engine, params.target_cycle, record.amount_stacked);
        if record.to_return == 0 && entitlement == 0 {
            return Err(EngineError::NothingToRedeem.into());
        }

        state.engine.stackers.remove(&(params.target_cycle, user_id));
        let treasury = state.engine.treasury;
        if record.to_return > 0 {
            ledger.transfer_token(&treasury, &ctx.sender, record.to_return)?;
        }
        if entitlement > 0 {
            ledger.transfer_ustx(&treasury, &ctx.sender, entitlement)?;
        }
        log::debug!(
            "[Stacking] User {} claimed cycle {}: {} tokens back, {} uSTX",
            user_id,
            params.target_cycle,
            record.to_return,
            entitlement
        );
        Ok(())
    }

    // --- read-only ---

    fn entitlement(&self, state: &EngineState, cycle: u64, amount_stacked: u128) -> u128 {
        let stats = state.stats_at_cycle_or_default(cycle);
        if stats.amount_token == 0 || amount_stacked == 0 {
            return 0;
        }
        stats.amount_ustx * amount_stacked / stats.amount_token
    }

    /// The uSTX pool share `who` would receive for `cycle`.
    pub fn get_entitled_stacking_reward(
        &self,
        state: &EngineState,
        who: &Principal,
        cycle: u64,
    ) -> u128 {
        let user_id = match state.user_id(who) {
            Some(id) => id,
            None => return 0,
        };
        let record = state.stacker_at_cycle_or_default(cycle, user_id);
        self.entitlement(state, cycle, record.amount_stacked)
    }

    /// The stacking record of `user_id` at `cycle`, zeroed if absent.
    pub fn get_stacker_at_cycle_or_default(
        &self,
        state: &EngineState,
        cycle: u64,
        user_id: UserId,
    ) -> StackerCycleRecord {
        state.stacker_at_cycle_or_default(cycle, user_id)
    }

    /// The reward cycle containing `height`, or `None` before activation.
    pub fn get_reward_cycle(&self, state: &EngineState, height: u64) -> Option<u64> {
        let activation = state.activation_height?;
        RewardClock {
            activation_height: activation,
            cycle_length: self.config.reward_cycle_length,
        }
        .reward_cycle(height)
    }

    /// The first block height of `cycle`. `None` before activation.
    pub fn get_first_stacks_block_in_reward_cycle(
        &self,
        state: &EngineState,
        cycle: u64,
    ) -> Option<u64> {
        let activation = state.activation_height?;
        Some(
            RewardClock {
                activation_height: activation,
                cycle_length: self.config.reward_cycle_length,
            }
            .first_block_in_cycle(cycle),
        )
    }
}
