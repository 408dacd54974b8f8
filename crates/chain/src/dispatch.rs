// Path: crates/chain/src/dispatch.rs
//! The typed transaction surface of the local chain: one `Call` variant per
//! protocol operation, carrying its SCALE-encodable parameter struct.

use civic_services::jobs::{
    AddPrincipalArgumentParams, AddUintArgumentParams, CreateJobParams, JobIdParams,
};
use civic_services::mining::{
    ClaimMiningRewardParams, MineManyParams, MineTokensParams, SetCityWalletParams,
    UpdateCoinbaseAmountsParams, UpdateCoinbaseThresholdsParams,
};
use civic_services::registry::{
    ActivateCoreContractParams, InitializeContractsParams, UpgradeCoreContractParams,
    UpgradeJobParams,
};
use civic_services::stacking::{ClaimStackingRewardParams, StackTokensParams};
use civic_services::users::RegisterUserParams;
use civic_types::app::Principal;
use parity_scale_codec::{Decode, Encode};

/// Every operation the protocol exposes, with its parameters.
#[derive(Clone, Debug, Encode, Decode)]
pub enum Call {
    /// `register-user`.
    RegisterUser(RegisterUserParams),

    /// `create-job`.
    CreateJob(CreateJobParams),
    /// `add-uint-argument`.
    AddUintArgument(AddUintArgumentParams),
    /// `add-principal-argument`.
    AddPrincipalArgument(AddPrincipalArgumentParams),
    /// `activate-job`.
    ActivateJob(JobIdParams),
    /// `approve-job`.
    ApproveJob(JobIdParams),
    /// `disapprove-job`.
    DisapproveJob(JobIdParams),
    /// `mark-job-as-executed`.
    MarkJobAsExecuted(JobIdParams),
    /// `execute-replace-approver-job`.
    ExecuteReplaceApproverJob(JobIdParams),

    /// `initialize-contracts`.
    InitializeContracts(InitializeContractsParams),
    /// `activate-core-contract`.
    ActivateCoreContract(ActivateCoreContractParams),
    /// `upgrade-core-contract`.
    UpgradeCoreContract(UpgradeCoreContractParams),
    /// `execute-upgrade-core-contract-job`.
    ExecuteUpgradeCoreContractJob(UpgradeJobParams),

    /// `mine-tokens`.
    MineTokens(MineTokensParams),
    /// `mine-many`.
    MineMany(MineManyParams),
    /// `claim-mining-reward`.
    ClaimMiningReward(ClaimMiningRewardParams),
    /// `set-city-wallet`.
    SetCityWallet(SetCityWalletParams),
    /// `execute-set-city-wallet-job`.
    ExecuteSetCityWalletJob(JobIdParams),
    /// `update-coinbase-thresholds`.
    UpdateCoinbaseThresholds(UpdateCoinbaseThresholdsParams),
    /// `execute-update-coinbase-thresholds-job`.
    ExecuteUpdateCoinbaseThresholdsJob(JobIdParams),
    /// `update-coinbase-amounts`.
    UpdateCoinbaseAmounts(UpdateCoinbaseAmountsParams),
    /// `execute-update-coinbase-amounts-job`.
    ExecuteUpdateCoinbaseAmountsJob(JobIdParams),

    /// `stack-tokens`.
    StackTokens(StackTokensParams),
    /// `claim-stacking-reward`.
    ClaimStackingReward(ClaimStackingRewardParams),
}

/// A signed-in-spirit transaction: the protocol trusts the sender principal
/// as supplied, there is no signature layer here.
#[derive(Clone, Debug, Encode, Decode)]
pub struct Transaction {
    /// The submitting principal.
    pub sender: Principal,
    /// The operation to perform.
    pub call: Call,
}

impl Transaction {
    /// Convenience constructor.
    pub fn new(sender: Principal, call: Call) -> Self {
        Self { sender, call }
    }
}
