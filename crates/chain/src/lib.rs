// Path: crates/chain/src/lib.rs
//! A deterministic local chain for driving the CivicCoin protocol in tests
//! and simulations: sequential blocks, per-transaction receipts with
//! collected events, and snapshot-rollback atomicity for failed calls.

#![forbid(unsafe_code)]

pub mod assertions;
pub mod bank;
pub mod dispatch;

use civic_services::jobs::JobsModule;
use civic_services::mining::MiningModule;
use civic_services::registry::RegistryModule;
use civic_services::stacking::StackingModule;
use civic_services::state::ProtocolState;
use civic_services::users::UsersModule;
use civic_types::app::{Principal, ProtocolEvent};
use civic_types::context::TxContext;
use civic_types::error::TransactionError;
use civic_types::service_configs::ProtocolConfig;

pub use bank::Bank;
pub use dispatch::{Call, Transaction};

/// The outcome of one transaction: the handler result plus every event the
/// ledger collected while it ran. A failed transaction carries no events.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// The principal that submitted the transaction.
    pub sender: Principal,
    /// The handler result.
    pub result: Result<(), TransactionError>,
    /// Events emitted during execution, in order.
    pub events: Vec<ProtocolEvent>,
}

/// One mined block.
#[derive(Debug, Clone)]
pub struct Block {
    /// The block's height.
    pub height: u64,
    /// One receipt per submitted transaction, in order.
    pub receipts: Vec<Receipt>,
}

/// The local chain: protocol state, account books and a height counter.
pub struct Chain {
    height: u64,
    state: ProtocolState,
    bank: Bank,
    users: UsersModule,
    jobs: JobsModule,
    registry: RegistryModule,
    mining: MiningModule,
    stacking: StackingModule,
}

impl Chain {
    /// Boots a chain at height 0 with genesis protocol state.
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            height: 0,
            state: ProtocolState::genesis(&config),
            bank: Bank::default(),
            users: UsersModule::new(config.engine.clone(), config.jobs.clone()),
            jobs: JobsModule::new(config.jobs.clone()),
            registry: RegistryModule::new(config.jobs.clone()),
            mining: MiningModule::new(config.engine.clone(), config.jobs.clone()),
            stacking: StackingModule::new(config.engine.clone()),
        }
    }

    /// Mines one block containing `txs`, in order. Each transaction runs
    /// against a snapshot; a failed one is rolled back wholesale so it has
    /// no effect on state, balances or events.
    pub fn mine_block(&mut self, txs: Vec<Transaction>) -> Block {
        self.height += 1;
        let height = self.height;
        tracing::debug!(height, tx_count = txs.len(), "mining block");

        let mut receipts = Vec::with_capacity(txs.len());
        for tx in txs {
            let snapshot_state = self.state.clone();
            let snapshot_bank = self.bank.clone();
            let ctx = TxContext {
                block_height: height,
                sender: tx.sender,
            };

            let result = self.execute(tx.call, &ctx);
            let events = if result.is_ok() {
                self.bank.drain_events()
            } else {
                self.state = snapshot_state;
                self.bank = snapshot_bank;
                Vec::new()
            };
            if let Err(e) = &result {
                tracing::debug!(height, sender = %tx.sender, error = %e, "transaction rejected");
            }
            receipts.push(Receipt {
                sender: tx.sender,
                result,
                events,
            });
        }
        Block { height, receipts }
    }

    fn execute(&mut self, call: Call, ctx: &TxContext) -> Result<(), TransactionError> {
        let state = &mut self.state;
        let bank = &mut self.bank;
        match call {
            Call::RegisterUser(p) => self.users.register_user(state, bank, p, ctx).map(|_| ()),

            Call::CreateJob(p) => self.jobs.create_job(&mut state.jobs, p, ctx).map(|_| ()),
            Call::AddUintArgument(p) => self.jobs.add_uint_argument(&mut state.jobs, p, ctx),
            Call::AddPrincipalArgument(p) => {
                self.jobs.add_principal_argument(&mut state.jobs, p, ctx)
            }
            Call::ActivateJob(p) => self.jobs.activate_job(&mut state.jobs, p, ctx),
            Call::ApproveJob(p) => self.jobs.approve_job(&mut state.jobs, p, ctx),
            Call::DisapproveJob(p) => self.jobs.disapprove_job(&mut state.jobs, p, ctx),
            Call::MarkJobAsExecuted(p) => self.jobs.mark_job_as_executed(&mut state.jobs, p, ctx),
            Call::ExecuteReplaceApproverJob(p) => {
                self.jobs.execute_replace_approver_job(&mut state.jobs, p, ctx)
            }

            Call::InitializeContracts(p) => self.registry.initialize_contracts(state, p, ctx),
            Call::ActivateCoreContract(p) => self.registry.activate_core_contract(state, p, ctx),
            Call::UpgradeCoreContract(p) => self.registry.upgrade_core_contract(state, p, ctx),
            Call::ExecuteUpgradeCoreContractJob(p) => {
                self.registry.execute_upgrade_core_contract_job(state, p, ctx)
            }

            Call::MineTokens(p) => self.mining.mine_tokens(state, bank, p, ctx),
            Call::MineMany(p) => self.mining.mine_many(state, bank, p, ctx),
            Call::ClaimMiningReward(p) => self.mining.claim_mining_reward(state, bank, p, ctx),
            Call::SetCityWallet(p) => self.mining.set_city_wallet(state, p, ctx),
            Call::ExecuteSetCityWalletJob(p) => {
                self.mining.execute_set_city_wallet_job(state, p, ctx)
            }
            Call::UpdateCoinbaseThresholds(p) => {
                self.mining.update_coinbase_thresholds(state, p, ctx)
            }
            Call::ExecuteUpdateCoinbaseThresholdsJob(p) => {
                self.mining.execute_update_coinbase_thresholds_job(state, p, ctx)
            }
            Call::UpdateCoinbaseAmounts(p) => self.mining.update_coinbase_amounts(state, p, ctx),
            Call::ExecuteUpdateCoinbaseAmountsJob(p) => {
                self.mining.execute_update_coinbase_amounts_job(state, p, ctx)
            }

            Call::StackTokens(p) => self.stacking.stack_tokens(state, bank, p, ctx),
            Call::ClaimStackingReward(p) => {
                self.stacking.claim_stacking_reward(state, bank, p, ctx)
            }
        }
    }

    /// Mines `count` empty blocks.
    pub fn mine_empty_block(&mut self, count: u64) {
        for _ in 0..count {
            self.mine_block(Vec::new());
        }
    }

    /// Mines empty blocks until the chain sits at `height`.
    pub fn mine_empty_block_until(&mut self, height: u64) {
        while self.height < height {
            self.mine_block(Vec::new());
        }
    }

    /// The current chain height.
    pub fn block_height(&self) -> u64 {
        self.height
    }

    /// Read access to the protocol state.
    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    /// Credits native currency to an account. Test genesis only.
    pub fn fund_ustx(&mut self, who: &Principal, amount: u128) {
        self.bank.credit_ustx(who, amount);
    }

    /// Credits tokens to an account. Test genesis only.
    pub fn fund_token(&mut self, who: &Principal, amount: u128) {
        self.bank.credit_token(who, amount);
    }

    /// Native balance of `who`.
    pub fn ustx_balance(&self, who: &Principal) -> u128 {
        use civic_services::ledger::LedgerAccess;
        self.bank.ustx_balance(who)
    }

    /// Token balance of `who`.
    pub fn token_balance(&self, who: &Principal) -> u128 {
        use civic_services::ledger::LedgerAccess;
        self.bank.token_balance(who)
    }

    /// The jobs service, for read-only queries.
    pub fn jobs(&self) -> &JobsModule {
        &self.jobs
    }

    /// The registry service, for read-only queries.
    pub fn registry(&self) -> &RegistryModule {
        &self.registry
    }

    /// The user registry service, for read-only queries.
    pub fn users(&self) -> &UsersModule {
        &self.users
    }

    /// The mining service, for read-only queries.
    pub fn mining(&self) -> &MiningModule {
        &self.mining
    }

    /// The stacking service, for read-only queries.
    pub fn stacking(&self) -> &StackingModule {
        &self.stacking
    }
}
