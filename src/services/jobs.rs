//! Background report jobs
//!
//! Handlers only enqueue; a pool of workers consumes the queue, runs each job
//! under a timeout and records the outcome in a [`JobStatusStore`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::{
    sync::{mpsc, Mutex, RwLock},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::{
    config::ReportsConfig,
    error::{AppError, AppResult},
    models::report::{JobState, JobStatus, JobTrigger},
    services::reports::ReportService,
};

/// Storage for job statuses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStatusStore: Send + Sync {
    async fn put(&self, status: &JobStatus) -> AppResult<()>;
    async fn get(&self, task_id: Uuid) -> AppResult<Option<JobStatus>>;
}

/// In-process status store, used when no Redis URL is configured
pub struct MemoryJobStore {
    statuses: RwLock<HashMap<Uuid, JobStatus>>,
    ttl: chrono::Duration,
}

impl MemoryJobStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            statuses: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::days(1)),
        }
    }
}

#[async_trait]
impl JobStatusStore for MemoryJobStore {
    async fn put(&self, status: &JobStatus) -> AppResult<()> {
        let cutoff = Utc::now() - self.ttl;
        let mut statuses = self.statuses.write().await;
        statuses.retain(|_, s| s.updated_at >= cutoff);
        statuses.insert(status.task_id, status.clone());
        Ok(())
    }

    async fn get(&self, task_id: Uuid) -> AppResult<Option<JobStatus>> {
        let cutoff = Utc::now() - self.ttl;
        Ok(self
            .statuses
            .read()
            .await
            .get(&task_id)
            .filter(|s| s.updated_at >= cutoff)
            .cloned())
    }
}

#[derive(Debug)]
struct ReportJob {
    task_id: Uuid,
    trigger: JobTrigger,
}

/// Handle to the report job queue
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<ReportJob>,
    statuses: Arc<dyn JobStatusStore>,
}

impl JobQueue {
    /// Spawn the worker pool and return a handle for enqueueing
    pub fn start(
        reports: ReportService,
        statuses: Arc<dyn JobStatusStore>,
        config: &ReportsConfig,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let timeout = config.job_timeout();

        for worker in 0..config.workers.max(1) {
            tokio::spawn(run_worker(
                worker,
                receiver.clone(),
                reports.clone(),
                statuses.clone(),
                timeout,
            ));
        }

        tracing::info!(workers = config.workers.max(1), "Report workers started");
        Self { sender, statuses }
    }

    /// Queue a report job and return its task id without waiting for it
    pub async fn enqueue(&self, trigger: JobTrigger) -> AppResult<Uuid> {
        let task_id = Uuid::new_v4();
        self.statuses
            .put(&JobStatus::new(task_id, trigger, JobState::Pending))
            .await?;

        if let Err(e) = self.sender.try_send(ReportJob { task_id, trigger }) {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "Report queue is full",
                mpsc::error::TrySendError::Closed(_) => "Report workers are not running",
            };
            let failed = JobStatus::new(
                task_id,
                trigger,
                JobState::Failed { error: reason.to_string() },
            );
            if let Err(e) = self.statuses.put(&failed).await {
                tracing::error!(%task_id, "Failed to record job status: {}", e);
            }
            return Err(AppError::Job(reason.to_string()));
        }

        tracing::info!(%task_id, ?trigger, "Report job enqueued");
        Ok(task_id)
    }

    pub async fn status(&self, task_id: Uuid) -> AppResult<JobStatus> {
        self.statuses
            .get(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task_id)))
    }
}

async fn run_worker(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<ReportJob>>>,
    reports: ReportService,
    statuses: Arc<dyn JobStatusStore>,
    timeout: Duration,
) {
    loop {
        // Hold the lock only while waiting for the next job
        let job = receiver.lock().await.recv().await;
        let Some(job) = job else {
            tracing::debug!(worker, "Report queue closed, worker exiting");
            break;
        };
        run_job(worker, job, &reports, statuses.as_ref(), timeout).await;
    }
}

async fn run_job(
    worker: usize,
    job: ReportJob,
    reports: &ReportService,
    statuses: &dyn JobStatusStore,
    timeout: Duration,
) {
    let ReportJob { task_id, trigger } = job;
    tracing::info!(worker, %task_id, "Report job started");
    record(statuses, JobStatus::new(task_id, trigger, JobState::Running)).await;

    // Only the counts are bounded; once a snapshot exists it is written out in full
    let state = match tokio::time::timeout(timeout, reports.snapshot()).await {
        Ok(Ok(report)) => match reports.persist(&report).await {
            Ok(artifact) => {
                tracing::info!(worker, %task_id, %artifact, "Report job succeeded");
                JobState::Succeeded { artifact, report }
            }
            Err(e) => {
                tracing::error!(worker, %task_id, "Report job failed to write artifact: {}", e);
                JobState::Failed { error: e.to_string() }
            }
        },
        Ok(Err(e)) => {
            tracing::error!(worker, %task_id, "Report job failed: {}", e);
            JobState::Failed { error: e.to_string() }
        }
        Err(_) => {
            tracing::error!(worker, %task_id, ?timeout, "Report job timed out");
            JobState::Failed {
                error: format!("Report generation timed out after {}s", timeout.as_secs_f64()),
            }
        }
    };

    record(statuses, JobStatus::new(task_id, trigger, state)).await;
}

async fn record(statuses: &dyn JobStatusStore, status: JobStatus) {
    if let Err(e) = statuses.put(&status).await {
        tracing::error!(task_id = %status.task_id, "Failed to record job status: {}", e);
    }
}

/// Enqueue a report job every `period`
pub fn spawn_scheduler(queue: JobQueue, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(?period, "Report scheduler started");
        loop {
            ticker.tick().await;
            if let Err(e) = queue.enqueue(JobTrigger::Schedule).await {
                tracing::error!("Scheduled report could not be enqueued: {}", e);
            }
        }
    })
}
