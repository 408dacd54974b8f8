// Path: crates/services/src/registry/mod.rs
//! The core contract registry: lifecycle records for every deployed engine
//! instance and the single active-contract pointer.
//!
//! Upgrade preconditions diverge between protocol revisions. V1 looks the
//! old contract up before anything else and reports a same-principal
//! upgrade as `Unauthorized`; V2 rejects same-principal and
//! already-registered targets up front as `ContractAlreadyExists`.

use civic_types::app::{CoreContractRecord, CoreContractState, JobId, Principal};
use civic_types::context::TxContext;
use civic_types::error::{AuthError, TransactionError};
use civic_types::service_configs::{JobsConfig, ProtocolVersion};
use parity_scale_codec::{Decode, Encode};

use crate::jobs::{JobIdParams, JobsModule};
use crate::state::ProtocolState;

/// Parameters for the one-time `initialize-contracts` call.
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct InitializeContractsParams {
    /// The first core contract instance.
    pub core_contract: Principal,
}

/// Parameters for `activate-core-contract`.
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct ActivateCoreContractParams {
    /// The contract to activate. Must be in the `Deployed` state.
    pub target: Principal,
    /// The height the contract becomes authoritative at.
    pub activation_height: u64,
}

/// Parameters for the direct, city-wallet-gated `upgrade-core-contract`.
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct UpgradeCoreContractParams {
    /// The currently registered contract being retired.
    pub old_contract: Principal,
    /// Its replacement.
    pub new_contract: Principal,
}

/// Parameters for the job-driven `execute-upgrade-core-contract-job`.
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct UpgradeJobParams {
    /// The approved job authorizing the upgrade.
    pub job_id: JobId,
    /// Must match the job's `oldContract` argument.
    pub old_contract: Principal,
    /// Must match the job's `newContract` argument.
    pub new_contract: Principal,
}

/// The core contract registry service.
pub struct RegistryModule {
    config: JobsConfig,
    jobs: JobsModule,
}

impl RegistryModule {
    /// Creates the module with its deployment configuration.
    pub fn new(config: JobsConfig) -> Self {
        let jobs = JobsModule::new(config.clone());
        Self { config, jobs }
    }

    /// Registers the first core contract and points the active pointer at
    /// it. Deployer only; callable exactly once.
    pub fn initialize_contracts(
        &self,
        state: &mut ProtocolState,
        params: InitializeContractsParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        if ctx.sender != self.config.deployer {
            return Err(AuthError::Unauthorized.into());
        }
        if state.registry.initialized {
            return Err(AuthError::Unauthorized.into());
        }

        state
            .registry
            .contracts
            .insert(params.core_contract, CoreContractRecord::deployed());
        state.registry.active = Some(params.core_contract);
        state.registry.initialized = true;
        log::info!(
            "[Registry] Initialized with core contract {}",
            params.core_contract
        );
        Ok(())
    }

    /// Flips a `Deployed` contract to `Active` at the given height. Only
    /// the contract itself may signal its own activation.
    pub fn activate_core_contract(
        &self,
        state: &mut ProtocolState,
        params: ActivateCoreContractParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        if ctx.sender != params.target {
            return Err(AuthError::Unauthorized.into());
        }
        self.mark_active(state, &params.target, params.activation_height)
    }

    /// Activation state transition, shared with the activation-threshold
    /// path in the user registry.
    pub(crate) fn mark_active(
        &self,
        state: &mut ProtocolState,
        target: &Principal,
        activation_height: u64,
    ) -> Result<(), TransactionError> {
        let record = state
            .registry
            .contracts
            .get_mut(target)
            .ok_or(AuthError::CoreContractNotFound)?;
        if record.state != CoreContractState::Deployed {
            return Err(AuthError::IncorrectContractState.into());
        }

        record.state = CoreContractState::Active;
        record.start_height = activation_height;
        log::info!(
            "[Registry] Core contract {} active from height {}",
            target,
            activation_height
        );
        Ok(())
    }

    /// Retires `old_contract` and registers `new_contract` as `Deployed`,
    /// moving the active pointer. City wallet only.
    pub fn upgrade_core_contract(
        &self,
        state: &mut ProtocolState,
        params: UpgradeCoreContractParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        if ctx.sender != state.engine.city_wallet {
            return Err(AuthError::Unauthorized.into());
        }
        self.apply_upgrade(state, &params.old_contract, &params.new_contract, ctx)
    }

    /// Job-driven upgrade: the job's `oldContract` / `newContract`
    /// arguments must match the supplied principals.
    pub fn execute_upgrade_core_contract_job(
        &self,
        state: &mut ProtocolState,
        params: UpgradeJobParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        self.jobs
            .executable_job(&state.jobs, params.job_id, &ctx.sender)?;
        let old_arg = self
            .jobs
            .get_principal_value_by_name(&state.jobs, params.job_id, "oldContract")
            .ok_or_else(|| AuthError::UnknownArgument("oldContract".into()))?;
        let new_arg = self
            .jobs
            .get_principal_value_by_name(&state.jobs, params.job_id, "newContract")
            .ok_or_else(|| AuthError::UnknownArgument("newContract".into()))?;
        if old_arg != params.old_contract || new_arg != params.new_contract {
            return Err(AuthError::Unauthorized.into());
        }

        self.apply_upgrade(state, &params.old_contract, &params.new_contract, ctx)?;
        self.jobs.mark_job_as_executed(
            &mut state.jobs,
            JobIdParams {
                job_id: params.job_id,
            },
            ctx,
        )
    }

    fn apply_upgrade(
        &self,
        state: &mut ProtocolState,
        old: &Principal,
        new: &Principal,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        match self.config.version {
            ProtocolVersion::V2 => {
                if old == new {
                    return Err(AuthError::ContractAlreadyExists.into());
                }
                if state.registry.contracts.contains_key(new) {
                    return Err(AuthError::ContractAlreadyExists.into());
                }
                if !state.registry.contracts.contains_key(old) {
                    return Err(AuthError::CoreContractNotFound.into());
                }
            }
            ProtocolVersion::V1 => {
                if !state.registry.contracts.contains_key(old) {
                    return Err(AuthError::CoreContractNotFound.into());
                }
                if old == new {
                    return Err(AuthError::Unauthorized.into());
                }
            }
        }

        let record = state
            .registry
            .contracts
            .get_mut(old)
            .ok_or(AuthError::CoreContractNotFound)?;
        record.state = CoreContractState::Inactive;
        record.end_height = ctx.block_height;
        state
            .registry
            .contracts
            .insert(*new, CoreContractRecord::deployed());
        state.registry.active = Some(*new);
        log::info!("[Registry] Core contract {} superseded by {}", old, new);
        Ok(())
    }

    // --- read-only ---

    /// The active core contract principal.
    pub fn get_active_core_contract(
        &self,
        state: &ProtocolState,
    ) -> Result<Principal, TransactionError> {
        state
            .registry
            .active
            .ok_or_else(|| AuthError::NoActiveCoreContract.into())
    }

    /// The lifecycle record for a registered contract.
    pub fn get_core_contract_info(
        &self,
        state: &ProtocolState,
        target: &Principal,
    ) -> Result<CoreContractRecord, TransactionError> {
        state
            .registry
            .contracts
            .get(target)
            .copied()
            .ok_or_else(|| AuthError::CoreContractNotFound.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_types::error::ErrorCode;
    use civic_types::service_configs::ProtocolConfig;

    fn setup(version: ProtocolVersion) -> (RegistryModule, ProtocolState) {
        let mut cfg = ProtocolConfig::default();
        cfg.jobs.version = version;
        cfg.jobs.deployer = Principal::from_label("deployer");
        cfg.city_wallet = Principal::from_label("city_wallet");
        let module = RegistryModule::new(cfg.jobs.clone());
        let mut state = ProtocolState::genesis(&cfg);

        let core = Principal::from_label("core-v1");
        module
            .initialize_contracts(
                &mut state,
                InitializeContractsParams {
                    core_contract: core,
                },
                &TxContext {
                    block_height: 1,
                    sender: Principal::from_label("deployer"),
                },
            )
            .unwrap();
        (module, state)
    }

    fn city_ctx(height: u64) -> TxContext {
        TxContext {
            block_height: height,
            sender: Principal::from_label("city_wallet"),
        }
    }

    #[test]
    fn initialize_is_one_time_and_deployer_only() {
        let (module, mut state) = setup(ProtocolVersion::V2);
        let err = module
            .initialize_contracts(
                &mut state,
                InitializeContractsParams {
                    core_contract: Principal::from_label("core-v2"),
                },
                &TxContext {
                    block_height: 2,
                    sender: Principal::from_label("deployer"),
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_UNAUTHORIZED");
    }

    #[test]
    fn activation_requires_the_deployed_state() {
        let (module, mut state) = setup(ProtocolVersion::V2);
        let core = Principal::from_label("core-v1");
        let ctx = TxContext {
            block_height: 5,
            sender: core,
        };
        module
            .activate_core_contract(
                &mut state,
                ActivateCoreContractParams {
                    target: core,
                    activation_height: 155,
                },
                &ctx,
            )
            .unwrap();
        let info = module.get_core_contract_info(&state, &core).unwrap();
        assert_eq!(info.state, CoreContractState::Active);
        assert_eq!(info.start_height, 155);

        let err = module
            .activate_core_contract(
                &mut state,
                ActivateCoreContractParams {
                    target: core,
                    activation_height: 200,
                },
                &ctx,
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_INCORRECT_CONTRACT_STATE");
    }

    #[test]
    fn upgrade_retires_old_and_deploys_new() {
        let (module, mut state) = setup(ProtocolVersion::V2);
        let old = Principal::from_label("core-v1");
        let new = Principal::from_label("core-v2");

        module
            .upgrade_core_contract(
                &mut state,
                UpgradeCoreContractParams {
                    old_contract: old,
                    new_contract: new,
                },
                &city_ctx(42),
            )
            .unwrap();

        let old_info = module.get_core_contract_info(&state, &old).unwrap();
        assert_eq!(old_info.state, CoreContractState::Inactive);
        assert_eq!(old_info.end_height, 42);
        let new_info = module.get_core_contract_info(&state, &new).unwrap();
        assert_eq!(new_info.state, CoreContractState::Deployed);
        assert_eq!(module.get_active_core_contract(&state).unwrap(), new);
    }

    #[test]
    fn upgrade_is_city_wallet_gated() {
        let (module, mut state) = setup(ProtocolVersion::V2);
        let err = module
            .upgrade_core_contract(
                &mut state,
                UpgradeCoreContractParams {
                    old_contract: Principal::from_label("core-v1"),
                    new_contract: Principal::from_label("core-v2"),
                },
                &TxContext {
                    block_height: 42,
                    sender: Principal::from_label("mallory"),
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_UNAUTHORIZED");
    }

    #[test]
    fn v2_rejects_same_principal_upgrades_before_lookup() {
        let (module, mut state) = setup(ProtocolVersion::V2);
        let ghost = Principal::from_label("never-registered");
        let err = module
            .upgrade_core_contract(
                &mut state,
                UpgradeCoreContractParams {
                    old_contract: ghost,
                    new_contract: ghost,
                },
                &city_ctx(42),
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_CONTRACT_ALREADY_EXISTS");
    }

    #[test]
    fn v2_rejects_an_already_registered_target() {
        let (module, mut state) = setup(ProtocolVersion::V2);
        let err = module
            .upgrade_core_contract(
                &mut state,
                UpgradeCoreContractParams {
                    old_contract: Principal::from_label("never-registered"),
                    new_contract: Principal::from_label("core-v1"),
                },
                &city_ctx(42),
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_CONTRACT_ALREADY_EXISTS");
    }

    #[test]
    fn v1_reports_same_principal_upgrades_as_unauthorized() {
        let (module, mut state) = setup(ProtocolVersion::V1);
        let core = Principal::from_label("core-v1");
        let err = module
            .upgrade_core_contract(
                &mut state,
                UpgradeCoreContractParams {
                    old_contract: core,
                    new_contract: core,
                },
                &city_ctx(42),
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_UNAUTHORIZED");

        // Unknown principals still fail the lookup first.
        let ghost = Principal::from_label("never-registered");
        let err = module
            .upgrade_core_contract(
                &mut state,
                UpgradeCoreContractParams {
                    old_contract: ghost,
                    new_contract: ghost,
                },
                &city_ctx(42),
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_CORE_CONTRACT_NOT_FOUND");
    }
}
