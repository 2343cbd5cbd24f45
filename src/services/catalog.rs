//! Catalog management service (authors and books)

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorInput},
        book::{BookInput, BookResponse},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, input: AuthorInput) -> AppResult<Author> {
        input.validate()?;
        let author = self.repository.authors.create(&input).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, input: AuthorInput) -> AppResult<Author> {
        input.validate()?;
        self.repository.authors.update(id, &input).await
    }

    /// Delete an author; fails while books still reference it
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    pub async fn list_books(&self) -> AppResult<Vec<BookResponse>> {
        self.repository.books.list().await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookResponse> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, input: BookInput) -> AppResult<BookResponse> {
        self.validate_book(&input).await?;
        let book = self.repository.books.create(&input).await?;
        tracing::info!(book_id = book.id, isbn = %book.isbn, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, input: BookInput) -> AppResult<BookResponse> {
        self.validate_book(&input).await?;
        self.repository.books.update(id, &input).await
    }

    /// Delete a book together with its borrow records
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    async fn validate_book(&self, input: &BookInput) -> AppResult<()> {
        input.validate()?;
        if !self.repository.authors.exists(input.author).await? {
            return Err(AppError::field(
                "author",
                format!("Invalid pk \"{}\" - object does not exist.", input.author),
            ));
        }
        Ok(())
    }
}
