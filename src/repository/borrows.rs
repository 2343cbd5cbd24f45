//! Borrow records repository: the borrow/return transactions

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{BorrowRecord, CreateBorrow},
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Lend one copy of a book.
    ///
    /// The book row stays locked from the copy check until commit, so concurrent
    /// borrows of the last copy are serialized and only one of them succeeds.
    pub async fn borrow(&self, request: &CreateBorrow) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, isbn, available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(request.book)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", request.book)))?;

        // Dropping `tx` on the error path rolls back and releases the lock
        let remaining = book.checkout()?;

        sqlx::query("UPDATE books SET available_copies = $1 WHERE id = $2")
            .bind(remaining)
            .bind(book.id)
            .execute(&mut *tx)
            .await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (book_id, borrowed_by, borrow_date)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(&request.borrowed_by)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Close a borrow record and put the copy back on the shelf.
    ///
    /// The record row is locked while its return date is checked, so a record
    /// increments the book's copies at most once. The book row is locked after
    /// the record, never before, so this cannot deadlock with `borrow`.
    pub async fn return_record(&self, record_id: i32) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE id = $1 FOR UPDATE",
        )
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", record_id)))?;

        let return_date = record.check_in(Utc::now())?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            "UPDATE borrow_records SET return_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(return_date)
        .bind(record.id)
        .fetch_one(&mut *tx)
        .await?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, isbn, available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(record.book_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET available_copies = $1 WHERE id = $2")
            .bind(book.checkin())
            .bind(book.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Count records not yet returned
    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_records WHERE return_date IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
