//! Report generation and lookup

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    error::AppResult,
    models::report::{LibraryCounts, LibraryReport},
    services::report_store::ReportStore,
};

/// Source of the aggregate counts a report snapshots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountsSource: Send + Sync {
    async fn counts(&self) -> AppResult<LibraryCounts>;
}

#[derive(Clone)]
pub struct ReportService {
    counts: Arc<dyn CountsSource>,
    store: ReportStore,
}

impl ReportService {
    pub fn new(counts: Arc<dyn CountsSource>, store: ReportStore) -> Self {
        Self { counts, store }
    }

    /// Read the current counts
    pub async fn snapshot(&self) -> AppResult<LibraryReport> {
        let counts = self.counts.counts().await?;
        Ok(LibraryReport::from_counts(counts, Utc::now()))
    }

    /// Write a snapshot as a new artifact and return the artifact name
    pub async fn persist(&self, report: &LibraryReport) -> AppResult<String> {
        Ok(self.store.write(report).await?)
    }

    /// Most recent report, `None` before the first generation
    pub async fn latest(&self) -> AppResult<Option<LibraryReport>> {
        Ok(self.store.latest().await?.map(|(_, report)| report))
    }
}
