//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book row from database
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub isbn: String,
    pub available_copies: i32,
}

impl Book {
    /// Copy count after lending one copy out.
    ///
    /// Fails without touching the book when nothing is left on the shelf.
    pub fn checkout(&self) -> AppResult<i32> {
        if self.available_copies < 1 {
            return Err(AppError::NoCopiesAvailable(
                "No copies available for the requested book.".to_string(),
            ));
        }
        Ok(self.available_copies - 1)
    }

    /// Copy count after a lent copy comes back
    pub fn checkin(&self) -> i32 {
        self.available_copies + 1
    }
}

/// Book as returned by the API, with the author's name resolved
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    /// Author name
    pub author: String,
    pub author_id: i32,
    pub isbn: String,
    pub available_copies: i32,
}

/// Create / full update book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookInput {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    /// Author ID
    pub author: i32,
    #[validate(length(min = 1, max = 13, message = "ISBN must be between 1 and 13 characters"))]
    pub isbn: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "Available copies cannot be negative"))]
    pub available_copies: i32,
}
