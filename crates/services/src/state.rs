// Path: crates/services/src/state.rs
//! The aggregate protocol state mutated by the service modules.
//!
//! Everything lives in owned ordered maps; the embedding chain snapshots the
//! whole aggregate per transaction to guarantee atomicity of failed calls.

use std::collections::{BTreeMap, BTreeSet};

use civic_types::app::{
    CoreContractRecord, Job, JobId, MinerCommitment, Principal, StackerCycleRecord,
    StackingStatsAtCycle, UserId,
};
use civic_types::service_configs::{CoinbaseAmounts, ProtocolConfig};

/// Job queue and approver registry state.
#[derive(Debug, Clone, Default)]
pub struct JobsState {
    /// All jobs ever created, by id.
    pub jobs: BTreeMap<JobId, Job>,
    /// The most recently allocated job id (ids are 1-based).
    pub last_job_id: JobId,
    /// Approver principals with their active flag. Replaced approvers stay
    /// in the map deactivated.
    pub approvers: BTreeMap<Principal, bool>,
}

impl JobsState {
    /// Whether `who` is a currently active approver.
    pub fn is_approver(&self, who: &Principal) -> bool {
        self.approvers.get(who).copied().unwrap_or(false)
    }
}

/// Core contract registry state.
#[derive(Debug, Clone, Default)]
pub struct RegistryState {
    /// Every principal ever registered, with its lifecycle record.
    pub contracts: BTreeMap<Principal, CoreContractRecord>,
    /// The single active-core-contract pointer.
    pub active: Option<Principal>,
    /// Set by the one-time `initialize-contracts` call.
    pub initialized: bool,
}

/// User registry, mining and stacking state.
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Recipient of the city split of every mined commitment.
    pub city_wallet: Principal,
    /// Protocol escrow holding stacked tokens and the stacker uSTX pool.
    pub treasury: Principal,
    /// Principal -> user id.
    pub user_ids: BTreeMap<Principal, UserId>,
    /// User id -> principal.
    pub users: BTreeMap<UserId, Principal>,
    /// The most recently allocated user id (ids are 1-based).
    pub last_user_id: UserId,
    /// Count of explicit `register-user` activation signals.
    pub signals: u64,
    /// Fixed once the activation threshold is reached.
    pub activation_height: Option<u64>,
    /// Commitments per block height, in submission order.
    pub miners: BTreeMap<u64, Vec<MinerCommitment>>,
    /// Winner user id per block height, recorded by the first successful
    /// mining claim.
    pub winners: BTreeMap<u64, UserId>,
    /// Block heights whose coinbase was already claimed.
    pub claimed_blocks: BTreeSet<u64>,
    /// Per (cycle, user) stacking records.
    pub stackers: BTreeMap<(u64, UserId), StackerCycleRecord>,
    /// Per-cycle totals: tokens locked and the uSTX pool accrued.
    pub cycle_stats: BTreeMap<u64, StackingStatsAtCycle>,
    /// Coinbase amount ladder, updatable through governance.
    pub coinbase_amounts: CoinbaseAmounts,
    /// Absolute epoch boundary heights, if governance overrode the schedule
    /// derived from the activation height.
    pub coinbase_thresholds: Option<[u64; 5]>,
}

impl EngineState {
    /// The user id of `who`, if one was ever assigned.
    pub fn user_id(&self, who: &Principal) -> Option<UserId> {
        self.user_ids.get(who).copied()
    }

    /// Returns the user id of `who`, assigning the next one if absent.
    pub fn get_or_create_user_id(&mut self, who: Principal) -> UserId {
        if let Some(id) = self.user_ids.get(&who) {
            return *id;
        }
        self.last_user_id += 1;
        let id = self.last_user_id;
        self.user_ids.insert(who, id);
        self.users.insert(id, who);
        id
    }

    /// The commitment of `user_id` at `height`, if any.
    pub fn commitment_at(&self, height: u64, user_id: UserId) -> Option<&MinerCommitment> {
        self.miners
            .get(&height)
            .and_then(|list| list.iter().find(|c| c.user_id == user_id))
    }

    /// Stacking record for `(cycle, user)`, zeroed if absent.
    pub fn stacker_at_cycle_or_default(&self, cycle: u64, user_id: UserId) -> StackerCycleRecord {
        self.stackers
            .get(&(cycle, user_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Per-cycle totals, zeroed if nobody ever stacked toward `cycle`.
    pub fn stats_at_cycle_or_default(&self, cycle: u64) -> StackingStatsAtCycle {
        self.cycle_stats.get(&cycle).cloned().unwrap_or_default()
    }
}

/// The whole protocol state, snapshot-cloned per transaction by the chain.
#[derive(Debug, Clone)]
pub struct ProtocolState {
    /// Job queue and approver registry.
    pub jobs: JobsState,
    /// Core contract registry.
    pub registry: RegistryState,
    /// User registry, mining and stacking engines.
    pub engine: EngineState,
}

impl ProtocolState {
    /// Builds the genesis state from a deployment configuration: the initial
    /// approver set is active, balances and registries are empty.
    pub fn genesis(config: &ProtocolConfig) -> Self {
        let mut approvers = BTreeMap::new();
        for approver in &config.jobs.approvers {
            approvers.insert(*approver, true);
        }
        Self {
            jobs: JobsState {
                jobs: BTreeMap::new(),
                last_job_id: 0,
                approvers,
            },
            registry: RegistryState::default(),
            engine: EngineState {
                city_wallet: config.city_wallet,
                treasury: Principal::from_label("civic-core"),
                user_ids: BTreeMap::new(),
                users: BTreeMap::new(),
                last_user_id: 0,
                signals: 0,
                activation_height: None,
                miners: BTreeMap::new(),
                winners: BTreeMap::new(),
                claimed_blocks: BTreeSet::new(),
                stackers: BTreeMap::new(),
                cycle_stats: BTreeMap::new(),
                coinbase_amounts: config.engine.coinbase,
                coinbase_thresholds: None,
            },
        }
    }
}
