// Path: crates/chain/tests/common/mod.rs
//! Shared scenario setup for the e2e tests: a small deployment with one
//! activation signal required and a five-approver governance set.

#![allow(dead_code)]

use civic_chain::{assert_tx_ok, Call, Chain, Transaction};
use civic_services::jobs::{
    AddPrincipalArgumentParams, AddUintArgumentParams, CreateJobParams, JobIdParams,
};
use civic_services::registry::InitializeContractsParams;
use civic_services::users::RegisterUserParams;
use civic_types::app::{JobId, Principal};
use civic_types::service_configs::ProtocolConfig;

pub fn p(label: &str) -> Principal {
    Principal::from_label(label)
}

pub fn core_v1() -> Principal {
    p("core-v1")
}

pub fn test_config() -> ProtocolConfig {
    let mut cfg = ProtocolConfig::default();
    cfg.jobs.deployer = p("deployer");
    cfg.jobs.approvers = (1..=5).map(|i| p(&format!("wallet_{i}"))).collect();
    cfg.engine.activation_threshold = 1;
    cfg.city_wallet = p("city_wallet");
    cfg
}

pub fn tx(sender: Principal, call: Call) -> Transaction {
    Transaction::new(sender, call)
}

/// A chain with the registry initialized but the engine not yet activated.
pub fn boot_chain() -> Chain {
    boot_chain_with(test_config())
}

pub fn boot_chain_with(cfg: ProtocolConfig) -> Chain {
    let mut chain = Chain::new(cfg);
    let block = chain.mine_block(vec![tx(
        p("deployer"),
        Call::InitializeContracts(InitializeContractsParams {
            core_contract: core_v1(),
        }),
    )]);
    assert_tx_ok!(block.receipts[0]);
    chain
}

/// A chain activated by a single `register-user` signal from `miner`, mined
/// forward to the activation height.
pub fn activated_chain() -> Chain {
    let mut chain = boot_chain();
    let block = chain.mine_block(vec![tx(
        p("miner"),
        Call::RegisterUser(RegisterUserParams { memo: None }),
    )]);
    assert_tx_ok!(block.receipts[0]);
    let activation = chain
        .state()
        .engine
        .activation_height
        .expect("threshold of one reached");
    chain.mine_empty_block_until(activation);
    chain
}

/// One job argument for [`approved_job`].
pub enum Arg {
    Uint(&'static str, u128),
    Principal(&'static str, Principal),
}

/// Drives a job from creation through quorum approval: created by
/// `wallet_1`, approved by `wallet_1..=3`. Returns the job id.
pub fn approved_job(chain: &mut Chain, name: &str, target: Principal, args: &[Arg]) -> JobId {
    let creator = p("wallet_1");
    let block = chain.mine_block(vec![tx(
        creator,
        Call::CreateJob(CreateJobParams {
            name: name.into(),
            target,
        }),
    )]);
    assert_tx_ok!(block.receipts[0]);
    let job_id = chain.state().jobs.last_job_id;

    let mut txs = Vec::new();
    for arg in args {
        txs.push(match arg {
            Arg::Uint(name, value) => tx(
                creator,
                Call::AddUintArgument(AddUintArgumentParams {
                    job_id,
                    name: (*name).into(),
                    value: *value,
                }),
            ),
            Arg::Principal(name, value) => tx(
                creator,
                Call::AddPrincipalArgument(AddPrincipalArgumentParams {
                    job_id,
                    name: (*name).into(),
                    value: *value,
                }),
            ),
        });
    }
    txs.push(tx(creator, Call::ActivateJob(JobIdParams { job_id })));
    for i in 1..=3 {
        txs.push(tx(
            p(&format!("wallet_{i}")),
            Call::ApproveJob(JobIdParams { job_id }),
        ));
    }
    let block = chain.mine_block(txs);
    for receipt in &block.receipts {
        assert_tx_ok!(receipt);
    }
    job_id
}
