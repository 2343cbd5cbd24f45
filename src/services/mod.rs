//! Business logic services

pub mod catalog;
pub mod jobs;
pub mod lending;
pub mod redis;
pub mod report_store;
pub mod reports;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub users: users::UsersService,
    pub reports: reports::ReportService,
    pub jobs: jobs::JobQueue,
}

impl Services {
    /// Create all services with the given repository and start the report workers
    pub async fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let statuses: Arc<dyn jobs::JobStatusStore> = match &config.redis.url {
            Some(url) => {
                let store = redis::RedisJobStore::new(url, config.reports.status_ttl_secs).await?;
                tracing::info!("Report job statuses stored in Redis");
                Arc::new(store)
            }
            None => Arc::new(jobs::MemoryJobStore::new(Duration::from_secs(
                config.reports.status_ttl_secs,
            ))),
        };

        let reports = reports::ReportService::new(
            Arc::new(repository.clone()),
            report_store::ReportStore::new(&config.reports.directory),
        );
        let jobs = jobs::JobQueue::start(reports.clone(), statuses, &config.reports);

        Ok(Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            lending: lending::LendingService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), config.auth.clone()),
            reports,
            jobs,
            repository,
        })
    }
}
