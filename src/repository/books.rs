//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{BookInput, BookResponse},
};

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, a.name AS author, b.author_id, b.isbn, b.available_copies
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

/// Map constraint violations on insert/update to field-level errors
fn map_write_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::field("isbn", "book with this isbn already exists.")
        }
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            AppError::field("author", "Invalid pk - object does not exist.")
        }
        sqlx::Error::Database(ref db) if db.is_check_violation() => {
            AppError::field("available_copies", "Available copies cannot be negative")
        }
        other => AppError::Database(other),
    }
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<BookResponse>> {
        let books = sqlx::query_as::<_, BookResponse>(&format!("{} ORDER BY b.id", BOOK_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BookResponse> {
        sqlx::query_as::<_, BookResponse>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn create(&self, input: &BookInput) -> AppResult<BookResponse> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author_id, isbn, available_copies)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(input.author)
        .bind(&input.isbn)
        .bind(input.available_copies)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i32, input: &BookInput) -> AppResult<BookResponse> {
        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, isbn = $3, available_copies = $4
            WHERE id = $5
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(input.author)
        .bind(&input.isbn)
        .bind(input.available_copies)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        match updated {
            Some(id) => self.get_by_id(id).await,
            None => Err(AppError::NotFound(format!("Book with id {} not found", id))),
        }
    }

    /// Delete a book and, through the foreign key, its borrow records
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
