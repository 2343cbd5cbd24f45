//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod borrows;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::LibraryCounts, services::reports::CountsSource};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub borrows: borrows::BorrowsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CountsSource for Repository {
    /// Independent counts; they are not read in one snapshot.
    async fn counts(&self) -> AppResult<LibraryCounts> {
        Ok(LibraryCounts {
            authors: self.authors.count().await?,
            books: self.books.count().await?,
            open_borrows: self.borrows.count_open().await?,
        })
    }
}
