//! Borrow record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Lifecycle of a borrow record. The only transition is Borrowed -> Returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
}

/// Borrow record row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BorrowRecord {
    pub id: i32,
    pub book_id: i32,
    pub borrowed_by: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn status(&self) -> BorrowStatus {
        match self.return_date {
            Some(_) => BorrowStatus::Returned,
            None => BorrowStatus::Borrowed,
        }
    }

    /// Return date to store when the copy comes back at `now`.
    ///
    /// A record is returned at most once.
    pub fn check_in(&self, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        match self.status() {
            BorrowStatus::Borrowed => Ok(now),
            BorrowStatus::Returned => Err(AppError::AlreadyReturned(
                "Book already returned".to_string(),
            )),
        }
    }
}

/// Borrow record as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowRecordResponse {
    pub id: i32,
    /// Book ID
    pub book: i32,
    pub borrowed_by: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
}

impl From<BorrowRecord> for BorrowRecordResponse {
    fn from(record: BorrowRecord) -> Self {
        let status = record.status();
        Self {
            id: record.id,
            book: record.book_id,
            borrowed_by: record.borrowed_by,
            borrow_date: record.borrow_date,
            return_date: record.return_date,
            status,
        }
    }
}

/// Borrow request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBorrow {
    /// Book ID
    pub book: i32,
    /// Free-text borrower identifier
    #[validate(length(min = 1, max = 255, message = "Borrower must be between 1 and 255 characters"))]
    pub borrowed_by: String,
}
