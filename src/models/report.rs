//! Library report and report job types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate counts read from the data store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LibraryCounts {
    pub authors: i64,
    pub books: i64,
    /// Borrow records without a return date
    pub open_borrows: i64,
}

/// Persisted report artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryReport {
    pub total_authors: i64,
    pub total_books: i64,
    pub total_borrowed_books: i64,
    /// Job execution time (ISO 8601)
    pub timestamp: DateTime<Utc>,
}

impl LibraryReport {
    pub fn from_counts(counts: LibraryCounts, timestamp: DateTime<Utc>) -> Self {
        Self {
            total_authors: counts.authors,
            total_books: counts.books,
            total_borrowed_books: counts.open_borrows,
            timestamp,
        }
    }
}

/// What started a report job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobTrigger {
    Api,
    Schedule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Succeeded { artifact: String, report: LibraryReport },
    Failed { error: String },
}

/// Status of a report job, as exposed on `/reports/tasks/{id}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub task_id: Uuid,
    pub trigger: JobTrigger,
    #[serde(flatten)]
    pub state: JobState,
    pub updated_at: DateTime<Utc>,
}

impl JobStatus {
    pub fn new(task_id: Uuid, trigger: JobTrigger, state: JobState) -> Self {
        Self {
            task_id,
            trigger,
            state,
            updated_at: Utc::now(),
        }
    }
}
