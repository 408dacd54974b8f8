// Path: crates/types/src/app/jobs.rs
//! Records for the job-based multisig governance queue.

use crate::app::Principal;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The lifecycle state of a governance job. Transitions are strictly
/// one-directional: `Inactive` → `Active` → `Executed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum JobStatus {
    /// Created but not yet opened for voting; arguments may still be added.
    Inactive,
    /// Open for approver votes and, once the quorum is met, execution.
    Active,
    /// Executed exactly once. Terminal.
    Executed,
}

/// A typed argument value attached to a job before activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum ArgumentValue {
    /// An unsigned integer argument.
    Uint(u128),
    /// A principal argument.
    Principal(Principal),
}

impl ArgumentValue {
    /// The contained uint, if this is a uint argument.
    pub fn as_uint(self) -> Option<u128> {
        match self {
            ArgumentValue::Uint(v) => Some(v),
            ArgumentValue::Principal(_) => None,
        }
    }

    /// The contained principal, if this is a principal argument.
    pub fn as_principal(self) -> Option<Principal> {
        match self {
            ArgumentValue::Principal(p) => Some(p),
            ArgumentValue::Uint(_) => None,
        }
    }
}

/// A named job argument with its sequential per-job id, usable for
/// positional lookup as an alternative to name lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct JobArgument {
    /// Sequential, 1-based id within the owning job.
    pub id: u64,
    /// The argument value.
    pub value: ArgumentValue,
}

/// A governance job: an administrative action gated behind a quorum of
/// approvers. Jobs are never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Job {
    /// Sequential, 1-based job id.
    pub id: u64,
    /// Human-readable job name, e.g. `"upgrade core"`.
    pub name: String,
    /// The principal that created the job.
    pub creator: Principal,
    /// The contract principal the job targets.
    pub target: Principal,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Number of recorded approvals.
    pub approvals: u32,
    /// Number of recorded disapprovals.
    pub disapprovals: u32,
    /// Last recorded vote per approver. `true` is an approval.
    pub votes: BTreeMap<Principal, bool>,
    /// Typed arguments keyed by name; fixed once the job is activated.
    pub arguments: BTreeMap<String, JobArgument>,
}

impl Job {
    /// Looks up an argument value by name.
    pub fn argument_by_name(&self, name: &str) -> Option<ArgumentValue> {
        self.arguments.get(name).map(|a| a.value)
    }

    /// Looks up an argument value by its sequential per-job id.
    pub fn argument_by_id(&self, id: u64) -> Option<ArgumentValue> {
        self.arguments.values().find(|a| a.id == id).map(|a| a.value)
    }
}
