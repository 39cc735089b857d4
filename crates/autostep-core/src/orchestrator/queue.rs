//! Local ordered job queue.

use crate::job::{Job, JobState};

/// Jobs in arrival order, deduplicated by id. Terminal jobs are removed.
#[derive(Debug, Default, Clone)]
pub struct JobQueue {
    jobs: Vec<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `job` unless a job with the same id is already queued.
    pub fn push_new(&mut self, job: Job) -> bool {
        if self.contains(&job.id) {
            return false;
        }
        self.jobs.push(job);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.jobs.iter().any(|j| j.id == id)
    }

    pub fn any_running(&self) -> bool {
        self.jobs.iter().any(|j| j.running)
    }

    /// Mark the first pending job running and return a copy of it.
    pub fn claim_next(&mut self) -> Option<Job> {
        let job = self
            .jobs
            .iter_mut()
            .find(|j| j.state == JobState::Pending && !j.running)?;
        job.running = true;
        Some(job.clone())
    }

    /// Record the terminal state of `id` and drop it from the queue.
    pub fn finish(&mut self, id: &str, state: JobState) -> Option<Job> {
        let pos = self.jobs.iter().position(|j| j.id == id)?;
        let mut job = self.jobs.remove(pos);
        job.state = state;
        job.running = false;
        Some(job)
    }

    pub fn snapshot(&self) -> Vec<Job> {
        self.jobs.clone()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_deduplicates_by_id() {
        let mut q = JobQueue::new();
        assert!(q.push_new(Job::new("j1", "demo", "a")));
        assert!(q.push_new(Job::new("j2", "demo", "b")));
        assert!(!q.push_new(Job::new("j1", "demo", "c")));
        let ids: Vec<_> = q.snapshot().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, ["j1", "j2"]);
    }

    #[test]
    fn claim_takes_first_pending_in_order() {
        let mut q = JobQueue::new();
        q.push_new(Job::new("j1", "demo", "a"));
        q.push_new(Job::new("j2", "demo", "b"));

        let first = q.claim_next().unwrap();
        assert_eq!(first.id, "j1");
        assert!(first.running);
        assert!(q.any_running());

        let second = q.claim_next().unwrap();
        assert_eq!(second.id, "j2");
        assert!(q.claim_next().is_none());
    }

    #[test]
    fn finish_removes_and_clears_running() {
        let mut q = JobQueue::new();
        q.push_new(Job::new("j1", "demo", "a"));
        q.claim_next();
        let done = q.finish("j1", JobState::Failed).unwrap();
        assert_eq!(done.state, JobState::Failed);
        assert!(!done.running);
        assert!(q.is_empty());
        assert!(!q.any_running());
        assert!(q.finish("j1", JobState::Failed).is_none());
    }
}
