// Path: crates/types/src/service_configs/mod.rs
//! Configuration structures for the protocol services.
//!
//! Defaults match the mainnet parameters of the original deployment; test
//! networks lower `activation_threshold` and the cycle length to keep
//! scenarios short.

use crate::app::Principal;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Which revision of the governance rules a deployment runs.
///
/// The two revisions differ only in the precondition ordering of the
/// core-contract upgrade path; see the registry service for details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// Original rules.
    V1,
    /// Revised rules.
    #[default]
    V2,
}

/// Configuration for the governance (auth) service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Approvals a job needs before it can be marked approved.
    pub required_approvals: u32,
    /// Governance rule revision.
    pub version: ProtocolVersion,
    /// The deployer principal, allowed to run one-time initialization.
    pub deployer: Principal,
    /// The initial approver set.
    pub approvers: Vec<Principal>,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            required_approvals: 3,
            version: ProtocolVersion::V2,
            deployer: Principal::from_label("deployer"),
            approvers: Vec::new(),
        }
    }
}

/// Schedule entry for the coinbase amount ladder.
///
/// Fields are `u64` so the ladder stays representable in TOML config
/// files; mints widen to `u128` at the ledger boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct CoinbaseAmounts {
    /// Amount minted per winning block inside the bonus window.
    pub bonus: u64,
    /// Amounts for epochs 1 through 5.
    pub epochs: [u64; 5],
    /// Amount for every block past epoch 5.
    pub tail: u64,
}

impl Default for CoinbaseAmounts {
    fn default() -> Self {
        Self {
            bonus: 250_000,
            epochs: [100_000, 50_000, 25_000, 12_500, 6_250],
            tail: 3_125,
        }
    }
}

/// Configuration for the economic engines (user registration, mining,
/// stacking, and the reward-cycle clock).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Registered-user signals required before the engine activates.
    pub activation_threshold: u64,
    /// Blocks between the threshold signal and the activation height.
    pub activation_delay: u64,
    /// Blocks a mining reward must age before it can be claimed.
    pub token_reward_maturity: u64,
    /// Length of one reward cycle, in blocks.
    pub reward_cycle_length: u64,
    /// Cycles between a stack call and the first locked cycle.
    pub reward_cycle_offset: u64,
    /// Percentage of each commitment routed to the city wallet. Values
    /// above 100 are clamped to 100 when the split is computed.
    pub split_city_pct: u64,
    /// Maximum number of cycles a single stack call may lock for.
    pub max_lock_period: u64,
    /// Length of the post-activation bonus window, in blocks.
    pub bonus_period: u64,
    /// Length of each coinbase epoch past the bonus window, in blocks.
    pub epoch_length: u64,
    /// The coinbase amount ladder.
    pub coinbase: CoinbaseAmounts,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 20,
            activation_delay: 150,
            token_reward_maturity: 100,
            reward_cycle_length: 2_100,
            reward_cycle_offset: 1,
            split_city_pct: 30,
            max_lock_period: 32,
            bonus_period: 10_000,
            epoch_length: 210_000,
            coinbase: CoinbaseAmounts::default(),
        }
    }
}

/// Top-level protocol configuration, grouping the per-service sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProtocolConfig {
    /// The city wallet receiving the city split of commitments.
    pub city_wallet: Principal,
    /// Governance service parameters.
    pub jobs: JobsConfig,
    /// Economic engine parameters.
    pub engine: EngineConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_engine_config_matches_mainnet_parameters() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.activation_delay, 150);
        assert_eq!(cfg.reward_cycle_length, 2_100);
        assert_eq!(cfg.split_city_pct, 30);
        assert_eq!(cfg.max_lock_period, 32);
        assert_eq!(cfg.coinbase.tail, 3_125);
    }

    #[test]
    fn protocol_config_round_trips_through_toml() {
        let cfg = ProtocolConfig {
            city_wallet: Principal::from_label("city_wallet"),
            jobs: JobsConfig {
                required_approvals: 2,
                version: ProtocolVersion::V1,
                deployer: Principal::from_label("deployer"),
                approvers: vec![
                    Principal::from_label("wallet_1"),
                    Principal::from_label("wallet_2"),
                ],
            },
            engine: EngineConfig {
                activation_threshold: 1,
                ..EngineConfig::default()
            },
        };

        let encoded = toml::to_string(&cfg).expect("serialize config");
        let decoded: ProtocolConfig = toml::from_str(&encoded).expect("parse config");

        assert_eq!(decoded.jobs.required_approvals, 2);
        assert_eq!(decoded.jobs.version, ProtocolVersion::V1);
        assert_eq!(decoded.jobs.approvers.len(), 2);
        assert_eq!(decoded.engine.activation_threshold, 1);
        assert_eq!(decoded.engine.split_city_pct, 30);
        assert_eq!(decoded.engine.coinbase, CoinbaseAmounts::default());
        assert_eq!(decoded.city_wallet, cfg.city_wallet);
    }
}
