//! Job queue orchestrator.
//!
//! Two periodic ticks drive the queue: the fetch tick appends newly seen
//! pending jobs from the [`JobSource`], the run tick starts the first pending
//! job when nothing is running. The `running` flag on a queued job is set
//! under the state lock before the job task is spawned, so at most one script
//! is ever in flight.

pub mod queue;

pub use queue::JobQueue;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::args::ArgumentContext;
use crate::config::OrchestratorConfig;
use crate::driver::PageBox;
use crate::env::ExecEnv;
use crate::error::{AutostepError, Result};
use crate::events::{EventBus, OrchestratorEvent};
use crate::human::ConfirmationGate;
use crate::job::{Job, JobState};
use crate::parameters::ParameterStore;
use crate::remote::JobSource;
use crate::script::run_script;
use crate::site::Site;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub fetch_interval: Duration,
    pub run_interval: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            fetch_interval: Duration::from_secs(10),
            run_interval: Duration::from_secs(10),
        }
    }
}

impl From<&OrchestratorConfig> for OrchestratorSettings {
    fn from(c: &OrchestratorConfig) -> Self {
        Self {
            fetch_interval: Duration::from_secs(c.fetch_interval_secs.max(1)),
            run_interval: Duration::from_secs(c.run_interval_secs.max(1)),
        }
    }
}

#[derive(Default)]
struct State {
    queue: JobQueue,
    sites: BTreeMap<String, Arc<Site>>,
    /// Session page reused by the next job.
    page: Option<PageBox>,
    /// Jobs finished here that the source may still list as pending. An id
    /// is dropped once a fetch no longer lists it.
    finished: BTreeSet<String>,
}

struct Shared {
    source: Arc<dyn JobSource>,
    env: ExecEnv,
    parameters: Arc<ParameterStore>,
    events: EventBus,
    state: Mutex<State>,
}

/// Process-scoped owner of the job queue, the site cache and the session
/// page. Cloning yields another handle to the same orchestrator.
#[derive(Clone)]
pub struct Orchestrator {
    shared: Arc<Shared>,
    settings: OrchestratorSettings,
}

/// The two tick tasks started by [`Orchestrator::start`].
pub struct OrchestratorHandle {
    fetcher: JoinHandle<()>,
    runner: JoinHandle<()>,
}

impl OrchestratorHandle {
    /// Stop ticking. A job already in flight keeps running to completion.
    pub fn stop(self) {
        self.fetcher.abort();
        self.runner.abort();
    }
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn JobSource>,
        env: ExecEnv,
        parameters: Arc<ParameterStore>,
        events: EventBus,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                env,
                parameters,
                events,
                state: Mutex::new(State::default()),
            }),
            settings: OrchestratorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    pub fn gate(&self) -> &Arc<ConfirmationGate> {
        &self.shared.env.gate
    }

    pub fn parameters(&self) -> &Arc<ParameterStore> {
        &self.shared.parameters
    }

    /// Copy of the local queue in arrival order.
    pub fn snapshot(&self) -> Vec<Job> {
        self.shared.lock().queue.snapshot()
    }

    /// Queue a job directly, bypassing the remote source.
    pub fn enqueue(&self, job: Job) -> bool {
        let id = job.id.clone();
        let added = self.shared.lock().queue.push_new(job);
        if added {
            self.shared.events.publish(OrchestratorEvent::JobQueued { id });
        }
        added
    }

    /// Pull pending jobs and append the ones neither queued nor already
    /// finished here. Returns how many were added.
    pub async fn fetch_tick(&self) -> Result<usize> {
        let jobs = self.shared.source.pending_jobs().await?;
        let mut added = Vec::new();
        {
            let mut state = self.shared.lock();
            let listed: BTreeSet<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
            state.finished.retain(|id| listed.contains(id.as_str()));
            for job in jobs {
                if job.state != JobState::Pending || state.finished.contains(&job.id) {
                    continue;
                }
                let id = job.id.clone();
                if state.queue.push_new(job) {
                    added.push(id);
                }
            }
        }
        for id in &added {
            debug!(job = %id, "job queued");
            self.shared
                .events
                .publish(OrchestratorEvent::JobQueued { id: id.clone() });
        }
        Ok(added.len())
    }

    /// Start the first pending job unless one is already running.
    pub fn run_tick(&self) -> Option<JoinHandle<()>> {
        let job = {
            let mut state = self.shared.lock();
            if state.queue.any_running() {
                return None;
            }
            state.queue.claim_next()?
        };
        let shared = self.shared.clone();
        Some(tokio::spawn(async move { shared.execute(job).await }))
    }

    pub fn start(&self) -> OrchestratorHandle {
        let fetcher = {
            let orch = self.clone();
            let mut tick = tokio::time::interval(self.settings.fetch_interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tokio::spawn(async move {
                loop {
                    tick.tick().await;
                    if let Err(e) = orch.fetch_tick().await {
                        warn!(error = %e, "fetching pending jobs failed");
                    }
                }
            })
        };
        let runner = {
            let orch = self.clone();
            let mut tick = tokio::time::interval(self.settings.run_interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tokio::spawn(async move {
                loop {
                    tick.tick().await;
                    orch.run_tick();
                }
            })
        };
        info!(
            fetch_secs = self.settings.fetch_interval.as_secs(),
            run_secs = self.settings.run_interval.as_secs(),
            "orchestrator started"
        );
        OrchestratorHandle { fetcher, runner }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Run one claimed job to a terminal state. Never fails: every error
    /// becomes a failed job.
    async fn execute(self: Arc<Self>, job: Job) {
        info!(job = %job.id, site = %job.site, script = %job.script, "job started");
        self.events.publish(OrchestratorEvent::JobStarted {
            id: job.id.clone(),
            site: job.site.clone(),
            script: job.script.clone(),
        });

        let task = {
            let shared = self.clone();
            let job = job.clone();
            tokio::spawn(async move { shared.run_job(&job).await })
        };
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(AutostepError::JobPanicked(e.to_string())),
        };

        let state = match &result {
            Ok(true) => JobState::Succeeded,
            Ok(false) | Err(_) => JobState::Failed,
        };
        {
            let mut guard = self.lock();
            guard.queue.finish(&job.id, state);
            guard.finished.insert(job.id.clone());
        }

        match result {
            Ok(true) => {
                info!(job = %job.id, "job succeeded");
                self.events
                    .publish(OrchestratorEvent::JobSucceeded { id: job.id.clone() });
            }
            Ok(false) => {
                error!(job = %job.id, "script did not complete");
                self.events.publish(OrchestratorEvent::JobFailed {
                    id: job.id.clone(),
                    error: "script did not complete".to_string(),
                });
            }
            Err(e) => {
                error!(job = %job.id, error = %e, "job failed");
                self.events.publish(OrchestratorEvent::JobFailed {
                    id: job.id.clone(),
                    error: e.to_string(),
                });
            }
        }

        if let Err(e) = self.source.update_job(&job.id, state).await {
            warn!(job = %job.id, state = %state, error = %e, "reporting job state failed");
        }
    }

    /// `Ok(true)` when the script completed, `Ok(false)` when it aborted or
    /// held its page.
    async fn run_job(&self, job: &Job) -> Result<bool> {
        let site = self.site(&job.site).await?;
        let parameters = self.parameters.all();
        let args = ArgumentContext::layered(&parameters, &job.args, &job.product);

        let page = self.lock().page.take();
        let outcome = run_script(&site, &job.script, &args, page, &self.env).await?;
        let success = outcome.is_success();
        if let Some(page) = outcome.into_page() {
            self.lock().page = Some(page);
        }
        Ok(success)
    }

    /// Cached site definition, fetched from the source on a miss.
    async fn site(&self, name: &str) -> Result<Arc<Site>> {
        let cached = self.lock().sites.get(name).cloned();
        if let Some(site) = cached {
            return Ok(site);
        }
        let site = Arc::new(self.source.site(name).await?);
        self.lock().sites.insert(name.to_string(), site.clone());
        Ok(site)
    }
}
