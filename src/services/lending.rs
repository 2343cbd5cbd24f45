//! Lending service: borrow and return of books

use validator::Validate;

use crate::{
    error::AppResult,
    models::borrow::{BorrowRecord, CreateBorrow},
    repository::Repository,
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
}

impl LendingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a copy of a book
    pub async fn borrow(&self, request: CreateBorrow) -> AppResult<BorrowRecord> {
        request.validate()?;

        let record = self.repository.borrows.borrow(&request).await.map_err(|e| {
            tracing::info!(book_id = request.book, borrowed_by = %request.borrowed_by, "Borrow rejected: {}", e);
            e
        })?;

        tracing::info!(
            record_id = record.id,
            book_id = record.book_id,
            borrowed_by = %record.borrowed_by,
            "Book borrowed"
        );
        Ok(record)
    }

    /// Return a borrowed book
    pub async fn return_book(&self, record_id: i32) -> AppResult<BorrowRecord> {
        let record = self.repository.borrows.return_record(record_id).await?;
        tracing::info!(record_id = record.id, book_id = record.book_id, "Book returned");
        Ok(record)
    }
}
