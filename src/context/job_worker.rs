use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Worker-local bookkeeping for one job executor thread.
///
/// Survives across acquisition cycles and is only dropped when the worker
/// removes it. Not stacked: a worker runs jobs from a flat acquisition loop.
#[derive(Debug, Clone, Default)]
pub struct JobWorkerContext {
    claimed_jobs: HashSet<String>,
    current_job: Option<String>,
    acquisition_cycles: u64,
    last_acquired_at: Option<DateTime<Utc>>,
}

impl JobWorkerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished acquisition and the job ids it claimed
    pub fn record_acquisition<I, S>(&mut self, job_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.claimed_jobs.extend(job_ids.into_iter().map(Into::into));
        self.acquisition_cycles += 1;
        self.last_acquired_at = Some(Utc::now());
    }

    pub fn start_job(&mut self, job_id: impl Into<String>) {
        self.current_job = Some(job_id.into());
    }

    /// Release a job once executed. Unknown ids are ignored.
    pub fn finish_job(&mut self, job_id: &str) {
        self.claimed_jobs.remove(job_id);
        if self.current_job.as_deref() == Some(job_id) {
            self.current_job = None;
        }
    }

    pub fn is_claimed(&self, job_id: &str) -> bool {
        self.claimed_jobs.contains(job_id)
    }

    pub fn claimed_jobs(&self) -> &HashSet<String> {
        &self.claimed_jobs
    }

    pub fn current_job(&self) -> Option<&str> {
        self.current_job.as_deref()
    }

    pub fn acquisition_cycles(&self) -> u64 {
        self.acquisition_cycles
    }

    pub fn last_acquired_at(&self) -> Option<DateTime<Utc>> {
        self.last_acquired_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_bookkeeping() {
        let mut worker = JobWorkerContext::new();
        worker.record_acquisition(["job-1", "job-2"]);
        worker.start_job("job-1");

        assert_eq!(worker.acquisition_cycles(), 1);
        assert!(worker.is_claimed("job-2"));
        assert_eq!(worker.current_job(), Some("job-1"));

        worker.finish_job("job-1");
        worker.finish_job("job-1");
        assert_eq!(worker.current_job(), None);
        assert!(!worker.is_claimed("job-1"));
        assert_eq!(worker.claimed_jobs().len(), 1);
    }
}
