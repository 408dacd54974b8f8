// Path: crates/services/src/users/mod.rs
//! User registration and activation signaling.
//!
//! Before the engine activates, `register-user` doubles as an activation
//! signal: the call that reaches the configured threshold fixes the
//! activation height and flips the active core contract record.

use civic_types::app::{Principal, ProtocolEvent, UserId};
use civic_types::context::TxContext;
use civic_types::error::{AuthError, EngineError, TransactionError};
use civic_types::service_configs::{EngineConfig, JobsConfig};
use parity_scale_codec::{Decode, Encode};

use crate::ledger::LedgerAccess;
use crate::registry::RegistryModule;
use crate::state::{EngineState, ProtocolState};

/// Parameters for `register-user`.
#[derive(Clone, Debug, Encode, Decode)]
pub struct RegisterUserParams {
    /// Optional memo echoed into the receipt.
    pub memo: Option<Vec<u8>>,
}

/// The user registry service.
pub struct UsersModule {
    config: EngineConfig,
    registry: RegistryModule,
}

impl UsersModule {
    /// Creates the module with its deployment configuration.
    pub fn new(config: EngineConfig, jobs: JobsConfig) -> Self {
        Self {
            config,
            registry: RegistryModule::new(jobs),
        }
    }

    /// Registers the sender and counts one activation signal. The signal
    /// that reaches the threshold schedules activation after the configured
    /// delay.
    pub fn register_user(
        &self,
        state: &mut ProtocolState,
        ledger: &mut dyn LedgerAccess,
        params: RegisterUserParams,
        ctx: &TxContext,
    ) -> Result<UserId, TransactionError> {
        if state.engine.user_id(&ctx.sender).is_some() {
            return Err(EngineError::UserAlreadyRegistered.into());
        }
        if state.engine.signals >= self.config.activation_threshold {
            return Err(EngineError::ActivationThresholdReached.into());
        }

        if let Some(memo) = params.memo {
            ledger.emit(ProtocolEvent::Memo(memo));
        }
        let id = state.engine.get_or_create_user_id(ctx.sender);
        state.engine.signals += 1;
        log::debug!(
            "[Users] {} registered as user {} ({}/{} signals)",
            ctx.sender,
            id,
            state.engine.signals,
            self.config.activation_threshold
        );

        if state.engine.signals == self.config.activation_threshold {
            let activation_height = ctx.block_height + self.config.activation_delay;
            state.engine.activation_height = Some(activation_height);
            let active = state
                .registry
                .active
                .ok_or(AuthError::NoActiveCoreContract)?;
            self.registry
                .mark_active(state, &active, activation_height)?;
            log::info!(
                "[Users] Activation threshold reached; engine activates at height {}",
                activation_height
            );
        }
        Ok(id)
    }

    // --- read-only ---

    /// The sender-assigned user id of `who`, if any.
    pub fn get_user_id(&self, state: &EngineState, who: &Principal) -> Option<UserId> {
        state.user_id(who)
    }

    /// The principal behind a user id, if the id was ever assigned.
    pub fn get_user(&self, state: &EngineState, id: UserId) -> Option<Principal> {
        state.users.get(&id).copied()
    }

    /// Number of user ids assigned so far.
    pub fn get_registered_users_nonce(&self, state: &EngineState) -> u64 {
        state.last_user_id
    }

    /// Whether the activation threshold has been reached.
    pub fn get_activation_status(&self, state: &EngineState) -> bool {
        state.activation_height.is_some()
    }

    /// The scheduled activation height.
    pub fn get_activation_block(&self, state: &EngineState) -> Result<u64, TransactionError> {
        state
            .activation_height
            .ok_or_else(|| EngineError::ContractNotActivated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InitializeContractsParams;
    use civic_types::app::CoreContractState;
    use civic_types::error::ErrorCode;
    use civic_types::service_configs::ProtocolConfig;

    struct NullLedger;

    impl LedgerAccess for NullLedger {
        fn ustx_balance(&self, _who: &Principal) -> u128 {
            0
        }
        fn token_balance(&self, _who: &Principal) -> u128 {
            0
        }
        fn transfer_ustx(
            &mut self,
            _from: &Principal,
            _to: &Principal,
            _amount: u128,
        ) -> Result<(), civic_types::error::TokenError> {
            Ok(())
        }
        fn transfer_token(
            &mut self,
            _from: &Principal,
            _to: &Principal,
            _amount: u128,
        ) -> Result<(), civic_types::error::TokenError> {
            Ok(())
        }
        fn mint_token(
            &mut self,
            _recipient: &Principal,
            _amount: u128,
        ) -> Result<(), civic_types::error::TokenError> {
            Ok(())
        }
        fn emit(&mut self, _event: ProtocolEvent) {}
    }

    fn setup(threshold: u64) -> (UsersModule, ProtocolState) {
        let mut cfg = ProtocolConfig::default();
        cfg.engine.activation_threshold = threshold;
        let module = UsersModule::new(cfg.engine.clone(), cfg.jobs.clone());
        let mut state = ProtocolState::genesis(&cfg);

        let registry = RegistryModule::new(cfg.jobs.clone());
        registry
            .initialize_contracts(
                &mut state,
                InitializeContractsParams {
                    core_contract: Principal::from_label("core-v1"),
                },
                &TxContext {
                    block_height: 1,
                    sender: cfg.jobs.deployer,
                },
            )
            .unwrap();
        (module, state)
    }

    fn register(module: &UsersModule, state: &mut ProtocolState, label: &str, height: u64) {
        module
            .register_user(
                state,
                &mut NullLedger,
                RegisterUserParams { memo: None },
                &TxContext {
                    block_height: height,
                    sender: Principal::from_label(label),
                },
            )
            .unwrap();
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let (module, mut state) = setup(5);
        register(&module, &mut state, "alice", 10);
        let err = module
            .register_user(
                &mut state,
                &mut NullLedger,
                RegisterUserParams { memo: None },
                &TxContext {
                    block_height: 11,
                    sender: Principal::from_label("alice"),
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "CORE_USER_ALREADY_REGISTERED");
    }

    #[test]
    fn threshold_signal_schedules_activation() {
        let (module, mut state) = setup(2);
        register(&module, &mut state, "alice", 10);
        assert!(!module.get_activation_status(&state.engine));

        register(&module, &mut state, "bob", 12);
        assert_eq!(state.engine.activation_height, Some(12 + 150));

        let record = state
            .registry
            .contracts
            .get(&Principal::from_label("core-v1"))
            .unwrap();
        assert_eq!(record.state, CoreContractState::Active);
        assert_eq!(record.start_height, 162);
    }

    #[test]
    fn registration_closes_at_the_threshold() {
        let (module, mut state) = setup(1);
        register(&module, &mut state, "alice", 10);
        let err = module
            .register_user(
                &mut state,
                &mut NullLedger,
                RegisterUserParams { memo: None },
                &TxContext {
                    block_height: 11,
                    sender: Principal::from_label("bob"),
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "CORE_ACTIVATION_THRESHOLD_REACHED");
    }
}
