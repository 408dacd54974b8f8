// Path: crates/types/src/error/mod.rs
//! Core error types for the CivicCoin protocol.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised by the governance (auth) contract family: the job queue,
/// the approver registry, and the core-contract registry.
///
/// Variant order mirrors the on-chain error table of the original deployment
/// (codes 6000..6012).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The referenced job id was never allocated.
    #[error("Job with ID {0} not found")]
    UnknownJob(u64),
    /// Wrong sender, deactivated approver, or job-argument mismatch.
    #[error("Unauthorized")]
    Unauthorized,
    /// The job was already activated (or executed).
    #[error("Job is already active")]
    JobIsActive,
    /// The operation requires an active job.
    #[error("Job is not active")]
    JobIsNotActive,
    /// The approver's recorded vote already matches the submitted vote.
    #[error("Approver already voted this way")]
    AlreadyVotedThisWay,
    /// The job was already executed.
    #[error("Job is already executed")]
    JobIsExecuted,
    /// Execution requires the approval quorum to be met.
    #[error("Job is not approved")]
    JobIsNotApproved,
    /// An argument with this name already exists on the job.
    #[error("Argument '{0}' already exists")]
    ArgumentAlreadyExists(String),
    /// No core contract has been activated yet.
    #[error("No active core contract")]
    NoActiveCoreContract,
    /// The referenced principal is not in the core-contract registry.
    #[error("Core contract not found")]
    CoreContractNotFound,
    /// The referenced argument does not exist on the job.
    #[error("Argument '{0}' not found")]
    UnknownArgument(String),
    /// The contract record is not in the state this operation requires.
    #[error("Incorrect core contract state")]
    IncorrectContractState,
    /// The target principal is already registered in a non-retired state.
    #[error("Core contract already exists")]
    ContractAlreadyExists,
}

impl ErrorCode for AuthError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownJob(_) => "AUTH_UNKNOWN_JOB",
            Self::Unauthorized => "AUTH_UNAUTHORIZED",
            Self::JobIsActive => "AUTH_JOB_IS_ACTIVE",
            Self::JobIsNotActive => "AUTH_JOB_IS_NOT_ACTIVE",
            Self::AlreadyVotedThisWay => "AUTH_ALREADY_VOTED_THIS_WAY",
            Self::JobIsExecuted => "AUTH_JOB_IS_EXECUTED",
            Self::JobIsNotApproved => "AUTH_JOB_IS_NOT_APPROVED",
            Self::ArgumentAlreadyExists(_) => "AUTH_ARGUMENT_ALREADY_EXISTS",
            Self::NoActiveCoreContract => "AUTH_NO_ACTIVE_CORE_CONTRACT",
            Self::CoreContractNotFound => "AUTH_CORE_CONTRACT_NOT_FOUND",
            Self::UnknownArgument(_) => "AUTH_UNKNOWN_ARGUMENT",
            Self::IncorrectContractState => "AUTH_INCORRECT_CONTRACT_STATE",
            Self::ContractAlreadyExists => "AUTH_CONTRACT_ALREADY_EXISTS",
        }
    }
}

/// Errors raised by the economic engines (user registry, mining, stacking).
///
/// Variant order mirrors the on-chain error table of the original deployment
/// (codes 1000..1018).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Wrong sender for a city-wallet-gated operation.
    #[error("Unauthorized")]
    Unauthorized,
    /// The sender already holds a user id.
    #[error("User already registered")]
    UserAlreadyRegistered,
    /// No user exists with the given id.
    #[error("User not found")]
    UserNotFound,
    /// The sender has no user id.
    #[error("User ID not found")]
    UserIdNotFound,
    /// Registration closed once the activation threshold was reached.
    #[error("Activation threshold already reached")]
    ActivationThresholdReached,
    /// The engine has not reached its activation height.
    #[error("Contract not activated")]
    ContractNotActivated,
    /// The sender already committed at this block height.
    #[error("User already mined at block {0}")]
    UserAlreadyMined(u64),
    /// A commitment must be greater than zero (and a `mine-many` list
    /// non-empty with every element greater than zero).
    #[error("Insufficient commitment")]
    InsufficientCommitment,
    /// The sender's native balance does not cover the commitment.
    #[error("Insufficient balance")]
    InsufficientBalance,
    /// The sender did not commit at the claimed block height.
    #[error("User did not mine in block {0}")]
    UserDidNotMineInBlock(u64),
    /// The reward at this height has not matured yet.
    #[error("Claimed before maturity")]
    ClaimedBeforeMaturity,
    /// Nobody committed at the claimed block height.
    #[error("No miners at block {0}")]
    NoMinersAtBlock(u64),
    /// The reward at this height was already claimed.
    #[error("Reward already claimed")]
    RewardAlreadyClaimed,
    /// The sender's commitment did not win this block.
    #[error("Miner did not win")]
    MinerDidNotWin,
    /// Stacking is not available before the engine activates.
    #[error("Stacking not available")]
    StackingNotAvailable,
    /// Zero amount or a lock period outside `1..=max_lock_period`.
    #[error("Cannot stack")]
    CannotStack,
    /// The claimed reward cycle has not fully elapsed.
    #[error("Reward cycle not completed")]
    RewardCycleNotCompleted,
    /// Nothing to redeem for this (user, cycle), or already claimed.
    #[error("Nothing to redeem")]
    NothingToRedeem,
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "CORE_UNAUTHORIZED",
            Self::UserAlreadyRegistered => "CORE_USER_ALREADY_REGISTERED",
            Self::UserNotFound => "CORE_USER_NOT_FOUND",
            Self::UserIdNotFound => "CORE_USER_ID_NOT_FOUND",
            Self::ActivationThresholdReached => "CORE_ACTIVATION_THRESHOLD_REACHED",
            Self::ContractNotActivated => "CORE_CONTRACT_NOT_ACTIVATED",
            Self::UserAlreadyMined(_) => "CORE_USER_ALREADY_MINED",
            Self::InsufficientCommitment => "CORE_INSUFFICIENT_COMMITMENT",
            Self::InsufficientBalance => "CORE_INSUFFICIENT_BALANCE",
            Self::UserDidNotMineInBlock(_) => "CORE_USER_DID_NOT_MINE_IN_BLOCK",
            Self::ClaimedBeforeMaturity => "CORE_CLAIMED_BEFORE_MATURITY",
            Self::NoMinersAtBlock(_) => "CORE_NO_MINERS_AT_BLOCK",
            Self::RewardAlreadyClaimed => "CORE_REWARD_ALREADY_CLAIMED",
            Self::MinerDidNotWin => "CORE_MINER_DID_NOT_WIN",
            Self::StackingNotAvailable => "CORE_STACKING_NOT_AVAILABLE",
            Self::CannotStack => "CORE_CANNOT_STACK",
            Self::RewardCycleNotCompleted => "CORE_REWARD_CYCLE_NOT_COMPLETED",
            Self::NothingToRedeem => "CORE_NOTHING_TO_REDEEM",
        }
    }
}

/// Errors from the fungible-token and native balance books.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token balance of the debited account is too low.
    #[error("Insufficient token balance")]
    FtInsufficientBalance,
    /// The native balance of the debited account is too low.
    #[error("Insufficient uSTX balance")]
    UstxInsufficientBalance,
    /// A credit would overflow the balance type.
    #[error("Balance overflow")]
    BalanceOverflow,
}

impl ErrorCode for TokenError {
    fn code(&self) -> &'static str {
        match self {
            Self::FtInsufficientBalance => "TOKEN_FT_INSUFFICIENT_BALANCE",
            Self::UstxInsufficientBalance => "TOKEN_USTX_INSUFFICIENT_BALANCE",
            Self::BalanceOverflow => "TOKEN_BALANCE_OVERFLOW",
        }
    }
}

/// Errors related to transaction processing. Every handler returns this
/// type; the first violated precondition wins and no state is mutated on
/// error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// An error originating from the governance contract family.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
    /// An error originating from the economic engines.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// An error originating from the balance books.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    /// The transaction is invalid for a reason outside the protocol tables.
    #[error("Invalid transaction: {0}")]
    Invalid(String),
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.code(),
            Self::Engine(e) => e.code(),
            Self::Token(e) => e.code(),
            Self::Invalid(_) => "TX_INVALID",
        }
    }
}
