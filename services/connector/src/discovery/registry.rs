use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use tessera_domain::id::AccountId;
use tessera_domain::message::MessageSource;

use crate::discovery::worker::CodeDiscoveryWorker;
use crate::domain::ports::RemoteAccountClient;
use crate::domain::types::{DiscoveryRecord, DiscoveryStatus};

struct RunningJob {
    job_id: Uuid,
    cancel: CancellationToken,
}

/// Per-account discovery jobs and their queryable results.
///
/// At most one job runs per account: starting a new one cancels the
/// previous worker's token and installs a fresh record under a new job id.
/// Workers write back exclusively through the job-id-checked methods, so a
/// superseded worker can never touch the record that replaced its own and
/// two FOUND results for one account are impossible.
pub struct DiscoveryRegistry {
    /// Runtime the workers run on. Captured at construction so jobs always
    /// land on the service runtime, never on the caller's context (usecases
    /// execute on the bridge runtime).
    runtime: Handle,
    budget: Duration,
    poll_interval: Duration,
    jobs: Mutex<HashMap<AccountId, RunningJob>>,
    results: Mutex<HashMap<AccountId, DiscoveryRecord>>,
}

impl DiscoveryRegistry {
    pub fn new(runtime: Handle, budget: Duration, poll_interval: Duration) -> Self {
        Self {
            runtime,
            budget,
            poll_interval,
            jobs: Mutex::new(HashMap::new()),
            results: Mutex::new(HashMap::new()),
        }
    }

    /// Launch a discovery job for `account_id`, taking ownership of the
    /// authenticated client. Any previous job for the account is signalled
    /// to stop and discarded.
    pub fn start(
        self: &Arc<Self>,
        account_id: AccountId,
        client: Box<dyn RemoteAccountClient>,
        search_started_at: DateTime<Utc>,
    ) {
        let job_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(previous) = jobs.insert(
                account_id,
                RunningJob {
                    job_id,
                    cancel: cancel.clone(),
                },
            ) {
                info!(account_id = %account_id, "replacing running discovery job");
                previous.cancel.cancel();
            }
        }
        self.results.lock().unwrap().insert(
            account_id,
            DiscoveryRecord::searching(job_id, account_id, search_started_at),
        );
        let worker = CodeDiscoveryWorker::new(
            Arc::clone(self),
            account_id,
            job_id,
            client,
            search_started_at,
            self.budget,
            self.poll_interval,
            cancel,
        );
        self.runtime.spawn(worker.run());
    }

    /// Signal the account's running job to stop. Cooperative: an in-flight
    /// fetch finishes before the worker observes the token.
    pub fn stop(&self, account_id: AccountId) {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.remove(&account_id) {
            job.cancel.cancel();
        }
    }

    pub fn status(&self, account_id: AccountId) -> Option<DiscoveryRecord> {
        self.results.lock().unwrap().get(&account_id).cloned()
    }

    /// Bump the attempt counter for one polling round and return the new
    /// count. Returns 0 when the job has been superseded, telling the
    /// worker to wind down without writing anything further.
    pub(crate) fn record_attempt(&self, account_id: AccountId, job_id: Uuid) -> u32 {
        let mut results = self.results.lock().unwrap();
        match results.get_mut(&account_id) {
            Some(record) if record.job_id == job_id => {
                record.attempts += 1;
                record.attempts
            }
            _ => 0,
        }
    }

    /// Record a terminal FOUND result. Compare-and-swap on job id: returns
    /// false (and writes nothing) if the job was replaced meanwhile.
    pub(crate) fn finish_found(
        &self,
        account_id: AccountId,
        job_id: Uuid,
        code: String,
        source: MessageSource,
    ) -> bool {
        self.finish(account_id, job_id, |record| {
            record.status = DiscoveryStatus::Found;
            record.code = Some(code);
            record.source = Some(source);
            record.found_at = Some(Utc::now());
        })
    }

    /// Record a terminal NOT_FOUND result, same CAS discipline.
    pub(crate) fn finish_not_found(&self, account_id: AccountId, job_id: Uuid) -> bool {
        self.finish(account_id, job_id, |record| {
            record.status = DiscoveryStatus::NotFound;
        })
    }

    fn finish(
        &self,
        account_id: AccountId,
        job_id: Uuid,
        apply: impl FnOnce(&mut DiscoveryRecord),
    ) -> bool {
        let updated = {
            let mut results = self.results.lock().unwrap();
            match results.get_mut(&account_id) {
                Some(record) if record.job_id == job_id => {
                    apply(record);
                    true
                }
                _ => false,
            }
        };
        if updated {
            let mut jobs = self.jobs.lock().unwrap();
            if jobs.get(&account_id).is_some_and(|j| j.job_id == job_id) {
                jobs.remove(&account_id);
            }
        }
        updated
    }
}
