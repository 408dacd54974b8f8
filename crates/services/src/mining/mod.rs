// Path: crates/services/src/mining/mod.rs
//! The mining engine: per-block uSTX commitments, the city/stacker split,
//! winner selection and matured coinbase claims.
//!
//! Winner selection is deterministic: the highest commitment at a block
//! wins, ties break to the earliest submission. The winner id is recorded
//! by the first successful claim at that height.

use civic_types::app::{MinerCommitment, Principal, ProtocolEvent, UserId};
use civic_types::context::TxContext;
use civic_types::error::{AuthError, EngineError, TransactionError};
use civic_types::service_configs::{CoinbaseAmounts, EngineConfig, JobsConfig};
use parity_scale_codec::{Decode, Encode};

use crate::clock::RewardClock;
use crate::jobs::{JobIdParams, JobsModule};
use crate::ledger::LedgerAccess;
use crate::state::{EngineState, ProtocolState};

/// Parameters for `mine-tokens`.
#[derive(Clone, Debug, Encode, Decode)]
pub struct MineTokensParams {
    /// The uSTX commitment for the current block. Must be nonzero.
    pub amount_ustx: u128,
    /// Optional memo echoed into the receipt before the transfers.
    pub memo: Option<Vec<u8>>,
}

/// Parameters for `mine-many`.
#[derive(Clone, Debug, Encode, Decode)]
pub struct MineManyParams {
    /// One commitment per consecutive block, starting at the current one.
    /// Must be non-empty with every element nonzero.
    pub amounts_ustx: Vec<u128>,
}

/// Parameters for `claim-mining-reward`.
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct ClaimMiningRewardParams {
    /// The mined block height being claimed.
    pub block_height: u64,
}

/// Parameters for the city-wallet-gated `set-city-wallet`.
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct SetCityWalletParams {
    /// The replacement wallet.
    pub new_city_wallet: Principal,
}

/// Parameters for `update-coinbase-thresholds` (direct or via job).
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct UpdateCoinbaseThresholdsParams {
    /// Absolute epoch boundary heights, ascending.
    pub thresholds: [u64; 5],
}

/// Parameters for `update-coinbase-amounts` (direct or via job).
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct UpdateCoinbaseAmountsParams {
    /// The replacement amount ladder.
    pub amounts: CoinbaseAmounts,
}

/// The mining engine service.
pub struct MiningModule {
    config: EngineConfig,
    jobs: JobsModule,
}

impl MiningModule {
    /// Creates the module with its deployment configuration.
    pub fn new(config: EngineConfig, jobs: JobsConfig) -> Self {
        Self {
            config,
            jobs: JobsModule::new(jobs),
        }
    }

    fn activation_height(
        &self,
        state: &EngineState,
        ctx: &TxContext,
    ) -> Result<u64, TransactionError> {
        match state.activation_height {
            Some(h) if ctx.block_height >= h => Ok(h),
            _ => Err(EngineError::ContractNotActivated.into()),
        }
    }

    fn clock(&self, activation_height: u64) -> RewardClock {
        RewardClock {
            activation_height,
            cycle_length: self.config.reward_cycle_length,
        }
    }

    /// Splits one block's commitment between the city wallet and the
    /// stacker pool of the block's cycle. The pool share only exists while
    /// the cycle has a nonzero stacked total.
    fn split_commitment(
        &self,
        state: &mut EngineState,
        clock: &RewardClock,
        height: u64,
        amount: u128,
    ) -> (u128, u128) {
        let cycle = match clock.reward_cycle(height) {
            Some(c) => c,
            None => return (amount, 0),
        };
        let stacking_active = state.stats_at_cycle_or_default(cycle).amount_token > 0;
        if !stacking_active {
            return (amount, 0);
        }

        // Split in quotient/remainder form so the product cannot overflow
        // even for commitments near u128::MAX.
        let pct = u128::from(self.config.split_city_pct.min(100));
        let to_city = amount / 100 * pct + amount % 100 * pct / 100;
        let to_stackers = amount - to_city;
        state.cycle_stats.entry(cycle).or_default().amount_ustx += to_stackers;
        (to_city, to_stackers)
    }

    /// Commits uSTX to the current block.
    pub fn mine_tokens(
        &self,
        state: &mut ProtocolState,
        ledger: &mut dyn LedgerAccess,
        params: MineTokensParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        let activation = self.activation_height(&state.engine, ctx)?;
        if params.amount_ustx == 0 {
            return Err(EngineError::InsufficientCommitment.into());
        }
        if let Some(id) = state.engine.user_id(&ctx.sender) {
            if state.engine.commitment_at(ctx.block_height, id).is_some() {
                return Err(EngineError::UserAlreadyMined(ctx.block_height).into());
            }
        }
        if ledger.ustx_balance(&ctx.sender) < params.amount_ustx {
            return Err(EngineError::InsufficientBalance.into());
        }

        let user_id = state.engine.get_or_create_user_id(ctx.sender);
        if let Some(memo) = params.memo {
            ledger.emit(ProtocolEvent::Memo(memo));
        }

        let clock = self.clock(activation);
        let (to_city, to_stackers) = self.split_commitment(
            &mut state.engine,
            &clock,
            ctx.block_height,
            params.amount_ustx,
        );
        let city_wallet = state.engine.city_wallet;
        let treasury = state.engine.treasury;
        if to_city > 0 {
            ledger.transfer_ustx(&ctx.sender, &city_wallet, to_city)?;
        }
        if to_stackers > 0 {
            ledger.transfer_ustx(&ctx.sender, &treasury, to_stackers)?;
        }

        state
            .engine
            .miners
            .entry(ctx.block_height)
            .or_default()
            .push(MinerCommitment {
                user_id,
                amount_ustx: params.amount_ustx,
            });
        log::debug!(
            "[Mining] User {} committed {} uSTX at height {}",
            user_id,
            params.amount_ustx,
            ctx.block_height
        );
        Ok(())
    }

    /// Commits uSTX to a run of consecutive blocks starting at the current
    /// one. Transfers are aggregated; the receipt closes with the covered
    /// block range.
    pub fn mine_many(
        &self,
        state: &mut ProtocolState,
        ledger: &mut dyn LedgerAccess,
        params: MineManyParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        let activation = self.activation_height(&state.engine, ctx)?;
        if params.amounts_ustx.is_empty() || params.amounts_ustx.iter().any(|a| *a == 0) {
            return Err(EngineError::InsufficientCommitment.into());
        }
        let mut total = 0u128;
        for amount in &params.amounts_ustx {
            total = total
                .checked_add(*amount)
                .ok_or(EngineError::InsufficientBalance)?;
        }
        if ledger.ustx_balance(&ctx.sender) < total {
            return Err(EngineError::InsufficientBalance.into());
        }
        if let Some(id) = state.engine.user_id(&ctx.sender) {
            for offset in 0..params.amounts_ustx.len() as u64 {
                let height = ctx.block_height + offset;
                if state.engine.commitment_at(height, id).is_some() {
                    return Err(EngineError::UserAlreadyMined(height).into());
                }
            }
        }

        let user_id = state.engine.get_or_create_user_id(ctx.sender);
        let clock = self.clock(activation);
        let mut city_total = 0u128;
        let mut stacker_total = 0u128;
        for (offset, amount) in params.amounts_ustx.iter().enumerate() {
            let height = ctx.block_height + offset as u64;
            let (to_city, to_stackers) =
                self.split_commitment(&mut state.engine, &clock, height, *amount);
            // The splits sum back to their amounts, so these stay within
            // `total` and cannot overflow past the balance check.
            city_total += to_city;
            stacker_total += to_stackers;
            state
                .engine
                .miners
                .entry(height)
                .or_default()
                .push(MinerCommitment {
                    user_id,
                    amount_ustx: *amount,
                });
        }

        let city_wallet = state.engine.city_wallet;
        let treasury = state.engine.treasury;
        if city_total > 0 {
            ledger.transfer_ustx(&ctx.sender, &city_wallet, city_total)?;
        }
        if stacker_total > 0 {
            ledger.transfer_ustx(&ctx.sender, &treasury, stacker_total)?;
        }
        let last_block = ctx.block_height + params.amounts_ustx.len() as u64 - 1;
        ledger.emit(ProtocolEvent::BlockRange {
            first_block: ctx.block_height,
            last_block,
        });
        log::debug!(
            "[Mining] User {} committed {} uSTX across blocks {}..={}",
            user_id,
            total,
            ctx.block_height,
            last_block
        );
        Ok(())
    }

    /// Claims the coinbase for a matured block the sender won. Records the
    /// block winner on first success.
    pub fn claim_mining_reward(
        &self,
        state: &mut ProtocolState,
        ledger: &mut dyn LedgerAccess,
        params: ClaimMiningRewardParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        if ctx.block_height <= params.block_height + self.config.token_reward_maturity {
            return Err(EngineError::ClaimedBeforeMaturity.into());
        }
        if !state.engine.miners.contains_key(&params.block_height) {
            return Err(EngineError::NoMinersAtBlock(params.block_height).into());
        }
        let user_id = state
            .engine
            .user_id(&ctx.sender)
            .ok_or(EngineError::UserIdNotFound)?;
        if state
            .engine
            .commitment_at(params.block_height, user_id)
            .is_none()
        {
            return Err(EngineError::UserDidNotMineInBlock(params.block_height).into());
        }
        if state.engine.claimed_blocks.contains(&params.block_height) {
            return Err(EngineError::RewardAlreadyClaimed.into());
        }
        if self.block_winner(&state.engine, params.block_height) != Some(user_id) {
            return Err(EngineError::MinerDidNotWin.into());
        }

        let amount = self.get_coinbase_amount(&state.engine, params.block_height);
        state.engine.winners.insert(params.block_height, user_id);
        state.engine.claimed_blocks.insert(params.block_height);
        ledger.mint_token(&ctx.sender, amount)?;
        log::info!(
            "[Mining] User {} claimed {} tokens for block {}",
            user_id,
            amount,
            params.block_height
        );
        Ok(())
    }

    /// Replaces the city wallet. Current city wallet only.
    pub fn set_city_wallet(
        &self,
        state: &mut ProtocolState,
        params: SetCityWalletParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        if ctx.sender != state.engine.city_wallet {
            return Err(EngineError::Unauthorized.into());
        }
        state.engine.city_wallet = params.new_city_wallet;
        log::info!("[Mining] City wallet set to {}", params.new_city_wallet);
        Ok(())
    }

    /// Job-driven city wallet replacement; the new wallet is the job's
    /// `newCityWallet` argument.
    pub fn execute_set_city_wallet_job(
        &self,
        state: &mut ProtocolState,
        params: JobIdParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        self.jobs
            .executable_job(&state.jobs, params.job_id, &ctx.sender)?;
        let new_wallet = self
            .jobs
            .get_principal_value_by_name(&state.jobs, params.job_id, "newCityWallet")
            .ok_or_else(|| AuthError::UnknownArgument("newCityWallet".into()))?;

        state.engine.city_wallet = new_wallet;
        self.jobs.mark_job_as_executed(&mut state.jobs, params, ctx)?;
        log::info!("[Mining] City wallet set to {} by job", new_wallet);
        Ok(())
    }

    /// Replaces the coinbase epoch boundaries. City wallet only.
    pub fn update_coinbase_thresholds(
        &self,
        state: &mut ProtocolState,
        params: UpdateCoinbaseThresholdsParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        if ctx.sender != state.engine.city_wallet {
            return Err(EngineError::Unauthorized.into());
        }
        state.engine.coinbase_thresholds = Some(params.thresholds);
        Ok(())
    }

    /// Job-driven threshold update; boundaries come from the job's
    /// `threshold1`..`threshold5` uint arguments.
    pub fn execute_update_coinbase_thresholds_job(
        &self,
        state: &mut ProtocolState,
        params: JobIdParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        self.jobs
            .executable_job(&state.jobs, params.job_id, &ctx.sender)?;
        let mut thresholds = [0u64; 5];
        for (i, slot) in thresholds.iter_mut().enumerate() {
            let name = format!("threshold{}", i + 1);
            let value = self
                .jobs
                .get_uint_value_by_name(&state.jobs, params.job_id, &name)
                .ok_or(AuthError::UnknownArgument(name))?;
            *slot = value as u64;
        }

        state.engine.coinbase_thresholds = Some(thresholds);
        self.jobs.mark_job_as_executed(&mut state.jobs, params, ctx)?;
        log::info!("[Mining] Coinbase thresholds set to {:?} by job", thresholds);
        Ok(())
    }

    /// Replaces the coinbase amount ladder. City wallet only.
    pub fn update_coinbase_amounts(
        &self,
        state: &mut ProtocolState,
        params: UpdateCoinbaseAmountsParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        if ctx.sender != state.engine.city_wallet {
            return Err(EngineError::Unauthorized.into());
        }
        state.engine.coinbase_amounts = params.amounts;
        Ok(())
    }

    /// Job-driven amount ladder update; amounts come from the job's
    /// `amountBonus`, `amount1`..`amount5` and `amountDefault` uint
    /// arguments.
    pub fn execute_update_coinbase_amounts_job(
        &self,
        state: &mut ProtocolState,
        params: JobIdParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        self.jobs
            .executable_job(&state.jobs, params.job_id, &ctx.sender)?;
        let arg = |name: &str| -> Result<u64, TransactionError> {
            self.jobs
                .get_uint_value_by_name(&state.jobs, params.job_id, name)
                .map(|value| value as u64)
                .ok_or_else(|| AuthError::UnknownArgument(name.into()).into())
        };
        let amounts = CoinbaseAmounts {
            bonus: arg("amountBonus")?,
            epochs: [
                arg("amount1")?,
                arg("amount2")?,
                arg("amount3")?,
                arg("amount4")?,
                arg("amount5")?,
            ],
            tail: arg("amountDefault")?,
        };

        state.engine.coinbase_amounts = amounts;
        self.jobs.mark_job_as_executed(&mut state.jobs, params, ctx)?;
        log::info!("[Mining] Coinbase amounts updated by job");
        Ok(())
    }

    // --- read-only ---

    /// The deterministic winner of `height`: highest commitment, ties to
    /// the earliest submission.
    pub fn block_winner(&self, state: &EngineState, height: u64) -> Option<UserId> {
        let miners = state.miners.get(&height)?;
        let mut winner: Option<&MinerCommitment> = None;
        for commitment in miners {
            match winner {
                Some(best) if commitment.amount_ustx <= best.amount_ustx => {}
                _ => winner = Some(commitment),
            }
        }
        winner.map(|c| c.user_id)
    }

    /// The recorded winner id, set by the first successful claim.
    pub fn get_block_winner_id(&self, state: &EngineState, height: u64) -> Option<UserId> {
        state.winners.get(&height).copied()
    }

    /// Whether `user_id` committed at `height`.
    pub fn has_mined_at_block(&self, state: &EngineState, height: u64, user_id: UserId) -> bool {
        state.commitment_at(height, user_id).is_some()
    }

    /// The commitment of `user_id` at `height`, if any.
    pub fn get_miner_at_block(
        &self,
        state: &EngineState,
        height: u64,
        user_id: UserId,
    ) -> Option<MinerCommitment> {
        state.commitment_at(height, user_id).copied()
    }

    /// The current city wallet.
    pub fn get_city_wallet(&self, state: &EngineState) -> Principal {
        state.city_wallet
    }

    /// The coinbase amount for a block mined at `height`. Zero before
    /// activation.
    pub fn get_coinbase_amount(&self, state: &EngineState, height: u64) -> u128 {
        let activation = match state.activation_height {
            Some(a) => a,
            None => return 0,
        };
        let amounts = &state.coinbase_amounts;
        let thresholds = state.coinbase_thresholds.unwrap_or_else(|| {
            let mut ts = [0u64; 5];
            let mut boundary = activation + self.config.bonus_period;
            for slot in ts.iter_mut() {
                boundary += self.config.epoch_length;
                *slot = boundary;
            }
            ts
        });

        if height <= thresholds[0] {
            if height <= activation + self.config.bonus_period {
                return u128::from(amounts.bonus);
            }
            return u128::from(amounts.epochs[0]);
        }
        for i in 1..5 {
            if height <= thresholds[i] {
                return u128::from(amounts.epochs[i]);
            }
        }
        u128::from(amounts.tail)
    }
}
