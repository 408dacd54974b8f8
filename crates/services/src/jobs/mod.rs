// Path: crates/services/src/jobs/mod.rs
//! The job queue and approver registry: quorum-gated administrative actions.
//!
//! A job is created by an approver, parameterized with typed arguments while
//! inactive, activated, voted on, and finally consumed exactly once by an
//! executor operation. Approvers carry an active flag so a replaced approver
//! stays in history but loses every capability.

use civic_types::app::{ArgumentValue, Job, JobArgument, JobId, JobStatus, Principal};
use civic_types::context::TxContext;
use civic_types::error::{AuthError, TransactionError};
use civic_types::service_configs::JobsConfig;
use parity_scale_codec::{Decode, Encode};

use crate::state::JobsState;

/// Parameters for `create-job`.
#[derive(Clone, Debug, Encode, Decode)]
pub struct CreateJobParams {
    /// Human-readable job name.
    pub name: String,
    /// The contract principal the job targets.
    pub target: Principal,
}

/// Parameters for every operation addressing a job by id.
#[derive(Clone, Copy, Debug, Encode, Decode)]
pub struct JobIdParams {
    /// The job to operate on.
    pub job_id: JobId,
}

/// Parameters for `add-uint-argument`.
#[derive(Clone, Debug, Encode, Decode)]
pub struct AddUintArgumentParams {
    /// The job to attach the argument to.
    pub job_id: JobId,
    /// Argument name, unique within the job.
    pub name: String,
    /// The value.
    pub value: u128,
}

/// Parameters for `add-principal-argument`.
#[derive(Clone, Debug, Encode, Decode)]
pub struct AddPrincipalArgumentParams {
    /// The job to attach the argument to.
    pub job_id: JobId,
    /// Argument name, unique within the job.
    pub name: String,
    /// The value.
    pub value: Principal,
}

/// The governance job queue service.
pub struct JobsModule {
    config: JobsConfig,
}

impl JobsModule {
    /// Creates the module with its deployment configuration.
    pub fn new(config: JobsConfig) -> Self {
        Self { config }
    }

    /// Creates a new inactive job owned by the sender. Approvers only.
    pub fn create_job(
        &self,
        state: &mut JobsState,
        params: CreateJobParams,
        ctx: &TxContext,
    ) -> Result<JobId, TransactionError> {
        if !state.is_approver(&ctx.sender) {
            return Err(AuthError::Unauthorized.into());
        }

        state.last_job_id += 1;
        let id = state.last_job_id;
        state.jobs.insert(
            id,
            Job {
                id,
                name: params.name.clone(),
                creator: ctx.sender,
                target: params.target,
                status: JobStatus::Inactive,
                approvals: 0,
                disapprovals: 0,
                votes: Default::default(),
                arguments: Default::default(),
            },
        );
        log::info!(
            "[Jobs] Job {} '{}' created by {}",
            id,
            params.name,
            ctx.sender
        );
        Ok(id)
    }

    /// Attaches a uint argument to an inactive job. Creator only.
    pub fn add_uint_argument(
        &self,
        state: &mut JobsState,
        params: AddUintArgumentParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        self.add_argument(
            state,
            params.job_id,
            params.name,
            ArgumentValue::Uint(params.value),
            ctx,
        )
    }

    /// Attaches a principal argument to an inactive job. Creator only.
    pub fn add_principal_argument(
        &self,
        state: &mut JobsState,
        params: AddPrincipalArgumentParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        self.add_argument(
            state,
            params.job_id,
            params.name,
            ArgumentValue::Principal(params.value),
            ctx,
        )
    }

    fn add_argument(
        &self,
        state: &mut JobsState,
        job_id: JobId,
        name: String,
        value: ArgumentValue,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        let job = state
            .jobs
            .get_mut(&job_id)
            .ok_or(AuthError::UnknownJob(job_id))?;
        if job.creator != ctx.sender {
            return Err(AuthError::Unauthorized.into());
        }
        if job.status != JobStatus::Inactive {
            return Err(AuthError::JobIsActive.into());
        }
        if job.arguments.contains_key(&name) {
            return Err(AuthError::ArgumentAlreadyExists(name).into());
        }

        let id = job.arguments.len() as u64 + 1;
        job.arguments.insert(name, JobArgument { id, value });
        Ok(())
    }

    /// Opens a job for voting; its arguments are frozen. Creator only.
    pub fn activate_job(
        &self,
        state: &mut JobsState,
        params: JobIdParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        let job = state
            .jobs
            .get_mut(&params.job_id)
            .ok_or(AuthError::UnknownJob(params.job_id))?;
        if job.creator != ctx.sender {
            return Err(AuthError::Unauthorized.into());
        }
        if job.status != JobStatus::Inactive {
            return Err(AuthError::JobIsActive.into());
        }

        job.status = JobStatus::Active;
        log::info!("[Jobs] Job {} activated", params.job_id);
        Ok(())
    }

    /// Records an approval vote on an active job.
    pub fn approve_job(
        &self,
        state: &mut JobsState,
        params: JobIdParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        self.vote(state, params.job_id, true, ctx)
    }

    /// Records a disapproval vote on an active job.
    pub fn disapprove_job(
        &self,
        state: &mut JobsState,
        params: JobIdParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        self.vote(state, params.job_id, false, ctx)
    }

    fn vote(
        &self,
        state: &mut JobsState,
        job_id: JobId,
        approve: bool,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        let is_approver = state.is_approver(&ctx.sender);
        let job = state
            .jobs
            .get_mut(&job_id)
            .ok_or(AuthError::UnknownJob(job_id))?;
        match job.status {
            JobStatus::Inactive => return Err(AuthError::JobIsNotActive.into()),
            JobStatus::Executed => return Err(AuthError::JobIsExecuted.into()),
            JobStatus::Active => {}
        }
        if !is_approver {
            return Err(AuthError::Unauthorized.into());
        }
        if job.votes.get(&ctx.sender) == Some(&approve) {
            return Err(AuthError::AlreadyVotedThisWay.into());
        }

        // A switched vote moves one tally to the other.
        if let Some(previous) = job.votes.insert(ctx.sender, approve) {
            if previous {
                job.approvals -= 1;
            } else {
                job.disapprovals -= 1;
            }
        }
        if approve {
            job.approvals += 1;
        } else {
            job.disapprovals += 1;
        }
        log::debug!(
            "[Jobs] Job {} now at {} approvals / {} disapprovals",
            job_id,
            job.approvals,
            job.disapprovals
        );
        Ok(())
    }

    /// Whether the job has met the approval quorum. Unknown or inactive
    /// jobs are simply not approved.
    pub fn is_job_approved(&self, state: &JobsState, job_id: JobId) -> bool {
        state
            .jobs
            .get(&job_id)
            .map(|job| job.approvals >= self.config.required_approvals)
            .unwrap_or(false)
    }

    /// Moves an approved active job to its terminal `Executed` state.
    pub fn mark_job_as_executed(
        &self,
        state: &mut JobsState,
        params: JobIdParams,
        _ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        let approved = self.is_job_approved(state, params.job_id);
        let job = state
            .jobs
            .get_mut(&params.job_id)
            .ok_or(AuthError::UnknownJob(params.job_id))?;
        match job.status {
            JobStatus::Inactive => return Err(AuthError::JobIsNotActive.into()),
            JobStatus::Executed => return Err(AuthError::JobIsExecuted.into()),
            JobStatus::Active => {}
        }
        if !approved {
            return Err(AuthError::JobIsNotApproved.into());
        }

        job.status = JobStatus::Executed;
        log::info!("[Jobs] Job {} executed", params.job_id);
        Ok(())
    }

    /// Validates that `job_id` can be executed by the sender and returns a
    /// copy of it. Executor operations call this first, apply their effect,
    /// and finish with [`Self::mark_job_as_executed`]; every precondition is
    /// checked here so nothing is written for a job that cannot execute.
    pub fn executable_job(
        &self,
        state: &JobsState,
        job_id: JobId,
        sender: &Principal,
    ) -> Result<Job, TransactionError> {
        if !state.is_approver(sender) {
            return Err(AuthError::Unauthorized.into());
        }
        let job = state
            .jobs
            .get(&job_id)
            .ok_or(AuthError::UnknownJob(job_id))?;
        match job.status {
            JobStatus::Inactive => return Err(AuthError::JobIsNotActive.into()),
            JobStatus::Executed => return Err(AuthError::JobIsExecuted.into()),
            JobStatus::Active => {}
        }
        if job.approvals < self.config.required_approvals {
            return Err(AuthError::JobIsNotApproved.into());
        }
        Ok(job.clone())
    }

    /// Swaps one approver for another, driven by an approved job carrying
    /// `oldApprover` and `newApprover` principal arguments.
    pub fn execute_replace_approver_job(
        &self,
        state: &mut JobsState,
        params: JobIdParams,
        ctx: &TxContext,
    ) -> Result<(), TransactionError> {
        let job = self.executable_job(state, params.job_id, &ctx.sender)?;
        let old = job
            .argument_by_name("oldApprover")
            .and_then(ArgumentValue::as_principal)
            .ok_or_else(|| AuthError::UnknownArgument("oldApprover".into()))?;
        let new = job
            .argument_by_name("newApprover")
            .and_then(ArgumentValue::as_principal)
            .ok_or_else(|| AuthError::UnknownArgument("newApprover".into()))?;

        state.approvers.insert(old, false);
        state.approvers.insert(new, true);
        self.mark_job_as_executed(state, params, ctx)?;
        log::info!("[Jobs] Approver {} replaced by {}", old, new);
        Ok(())
    }

    // --- read-only ---

    /// The job record, if it exists.
    pub fn get_job<'a>(&self, state: &'a JobsState, job_id: JobId) -> Option<&'a Job> {
        state.jobs.get(&job_id)
    }

    /// The most recently allocated job id.
    pub fn get_last_job_id(&self, state: &JobsState) -> JobId {
        state.last_job_id
    }

    /// Whether `who` is a currently active approver.
    pub fn is_approver(&self, state: &JobsState, who: &Principal) -> bool {
        state.is_approver(who)
    }

    /// Uint argument lookup by name.
    pub fn get_uint_value_by_name(
        &self,
        state: &JobsState,
        job_id: JobId,
        name: &str,
    ) -> Option<u128> {
        state
            .jobs
            .get(&job_id)
            .and_then(|job| job.argument_by_name(name))
            .and_then(ArgumentValue::as_uint)
    }

    /// Uint argument lookup by its sequential per-job id.
    pub fn get_uint_value_by_id(
        &self,
        state: &JobsState,
        job_id: JobId,
        argument_id: u64,
    ) -> Option<u128> {
        state
            .jobs
            .get(&job_id)
            .and_then(|job| job.argument_by_id(argument_id))
            .and_then(ArgumentValue::as_uint)
    }

    /// Principal argument lookup by name.
    pub fn get_principal_value_by_name(
        &self,
        state: &JobsState,
        job_id: JobId,
        name: &str,
    ) -> Option<Principal> {
        state
            .jobs
            .get(&job_id)
            .and_then(|job| job.argument_by_name(name))
            .and_then(ArgumentValue::as_principal)
    }

    /// Principal argument lookup by its sequential per-job id.
    pub fn get_principal_value_by_id(
        &self,
        state: &JobsState,
        job_id: JobId,
        argument_id: u64,
    ) -> Option<Principal> {
        state
            .jobs
            .get(&job_id)
            .and_then(|job| job.argument_by_id(argument_id))
            .and_then(ArgumentValue::as_principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_types::error::ErrorCode;

    fn setup() -> (JobsModule, JobsState) {
        let approvers: Vec<Principal> = (1..=5)
            .map(|i| Principal::from_label(&format!("wallet_{i}")))
            .collect();
        let config = JobsConfig {
            required_approvals: 3,
            approvers: approvers.clone(),
            ..JobsConfig::default()
        };
        let module = JobsModule::new(config.clone());
        let mut state = JobsState::default();
        for a in &approvers {
            state.approvers.insert(*a, true);
        }
        (module, state)
    }

    fn ctx(label: &str) -> TxContext {
        TxContext {
            block_height: 1,
            sender: Principal::from_label(label),
        }
    }

    fn new_active_job(module: &JobsModule, state: &mut JobsState) -> JobId {
        let id = module
            .create_job(
                state,
                CreateJobParams {
                    name: "test job".into(),
                    target: Principal::from_label("target"),
                },
                &ctx("wallet_1"),
            )
            .unwrap();
        module
            .activate_job(state, JobIdParams { job_id: id }, &ctx("wallet_1"))
            .unwrap();
        id
    }

    #[test]
    fn only_approvers_create_jobs() {
        let (module, mut state) = setup();
        let err = module
            .create_job(
                &mut state,
                CreateJobParams {
                    name: "x".into(),
                    target: Principal::from_label("target"),
                },
                &ctx("outsider"),
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_UNAUTHORIZED");
    }

    #[test]
    fn quorum_requires_three_distinct_approvals() {
        let (module, mut state) = setup();
        let id = new_active_job(&module, &mut state);

        for w in ["wallet_1", "wallet_2"] {
            module
                .approve_job(&mut state, JobIdParams { job_id: id }, &ctx(w))
                .unwrap();
        }
        assert!(!module.is_job_approved(&state, id));

        module
            .approve_job(&mut state, JobIdParams { job_id: id }, &ctx("wallet_3"))
            .unwrap();
        assert!(module.is_job_approved(&state, id));
    }

    #[test]
    fn repeating_the_same_vote_is_rejected_but_switching_retallies() {
        let (module, mut state) = setup();
        let id = new_active_job(&module, &mut state);

        module
            .approve_job(&mut state, JobIdParams { job_id: id }, &ctx("wallet_1"))
            .unwrap();
        let err = module
            .approve_job(&mut state, JobIdParams { job_id: id }, &ctx("wallet_1"))
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_ALREADY_VOTED_THIS_WAY");

        module
            .disapprove_job(&mut state, JobIdParams { job_id: id }, &ctx("wallet_1"))
            .unwrap();
        let job = module.get_job(&state, id).unwrap();
        assert_eq!((job.approvals, job.disapprovals), (0, 1));
    }

    #[test]
    fn voting_requires_an_active_job() {
        let (module, mut state) = setup();
        let id = module
            .create_job(
                &mut state,
                CreateJobParams {
                    name: "dormant".into(),
                    target: Principal::from_label("target"),
                },
                &ctx("wallet_1"),
            )
            .unwrap();
        let err = module
            .approve_job(&mut state, JobIdParams { job_id: id }, &ctx("wallet_2"))
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_JOB_IS_NOT_ACTIVE");
    }

    #[test]
    fn arguments_freeze_on_activation() {
        let (module, mut state) = setup();
        let id = new_active_job(&module, &mut state);
        let err = module
            .add_uint_argument(
                &mut state,
                AddUintArgumentParams {
                    job_id: id,
                    name: "amount".into(),
                    value: 1,
                },
                &ctx("wallet_1"),
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_JOB_IS_ACTIVE");
    }

    #[test]
    fn argument_names_are_unique_and_typed() {
        let (module, mut state) = setup();
        let id = module
            .create_job(
                &mut state,
                CreateJobParams {
                    name: "with args".into(),
                    target: Principal::from_label("target"),
                },
                &ctx("wallet_1"),
            )
            .unwrap();
        module
            .add_uint_argument(
                &mut state,
                AddUintArgumentParams {
                    job_id: id,
                    name: "amount".into(),
                    value: 42,
                },
                &ctx("wallet_1"),
            )
            .unwrap();
        let err = module
            .add_uint_argument(
                &mut state,
                AddUintArgumentParams {
                    job_id: id,
                    name: "amount".into(),
                    value: 7,
                },
                &ctx("wallet_1"),
            )
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_ARGUMENT_ALREADY_EXISTS");

        assert_eq!(module.get_uint_value_by_name(&state, id, "amount"), Some(42));
        assert_eq!(module.get_uint_value_by_id(&state, id, 1), Some(42));
        assert_eq!(module.get_principal_value_by_name(&state, id, "amount"), None);
    }

    #[test]
    fn replace_approver_job_locks_out_the_old_approver() {
        let (module, mut state) = setup();
        let old = Principal::from_label("wallet_5");
        let new = Principal::from_label("wallet_6");

        let id = module
            .create_job(
                &mut state,
                CreateJobParams {
                    name: "replace approver".into(),
                    target: Principal::from_label("auth"),
                },
                &ctx("wallet_1"),
            )
            .unwrap();
        module
            .add_principal_argument(
                &mut state,
                AddPrincipalArgumentParams {
                    job_id: id,
                    name: "oldApprover".into(),
                    value: old,
                },
                &ctx("wallet_1"),
            )
            .unwrap();
        module
            .add_principal_argument(
                &mut state,
                AddPrincipalArgumentParams {
                    job_id: id,
                    name: "newApprover".into(),
                    value: new,
                },
                &ctx("wallet_1"),
            )
            .unwrap();
        module
            .activate_job(&mut state, JobIdParams { job_id: id }, &ctx("wallet_1"))
            .unwrap();
        for w in ["wallet_1", "wallet_2", "wallet_3"] {
            module
                .approve_job(&mut state, JobIdParams { job_id: id }, &ctx(w))
                .unwrap();
        }
        module
            .execute_replace_approver_job(&mut state, JobIdParams { job_id: id }, &ctx("wallet_2"))
            .unwrap();

        assert!(!module.is_approver(&state, &old));
        assert!(module.is_approver(&state, &new));

        // The replaced approver lost every capability.
        let other = new_active_job(&module, &mut state);
        let err = module
            .approve_job(&mut state, JobIdParams { job_id: other }, &ctx("wallet_5"))
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_UNAUTHORIZED");
    }

    #[test]
    fn executing_twice_is_rejected() {
        let (module, mut state) = setup();
        let id = new_active_job(&module, &mut state);
        for w in ["wallet_1", "wallet_2", "wallet_3"] {
            module
                .approve_job(&mut state, JobIdParams { job_id: id }, &ctx(w))
                .unwrap();
        }
        module
            .mark_job_as_executed(&mut state, JobIdParams { job_id: id }, &ctx("wallet_1"))
            .unwrap();
        let err = module
            .mark_job_as_executed(&mut state, JobIdParams { job_id: id }, &ctx("wallet_1"))
            .unwrap_err();
        assert_eq!(err.code(), "AUTH_JOB_IS_EXECUTED");
    }
}
