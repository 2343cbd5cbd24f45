//! Data models for libmanage

pub mod author;
pub mod book;
pub mod borrow;
pub mod report;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorInput};
pub use book::{Book, BookInput, BookResponse};
pub use borrow::{BorrowRecord, BorrowRecordResponse, BorrowStatus, CreateBorrow};
pub use report::{JobState, JobStatus, JobTrigger, LibraryCounts, LibraryReport};
pub use user::{RegisterUser, RegisteredUser, TokenType, User, UserClaims};
