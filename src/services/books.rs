//! Book catalog and borrowing service

use chrono::{Local, NaiveDate};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BorrowState, CreateBook},
    repository::Repository,
};

pub const BOOK_NOT_FOUND: &str = "Book not found";

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books_list().await
    }

    pub async fn get(&self, serial_number: i64) -> AppResult<Book> {
        self.repository
            .books_find_by_serial(serial_number)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))
    }

    /// Create a book; a serial number already on file is a conflict
    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        let new_book = data.into_new_book(Self::today())?;
        let book = self.repository.books_create(&new_book).await?;
        tracing::info!(serial_number = book.serial_number, id = book.id, "book created");
        Ok(book)
    }

    /// Delete a book and return its last state
    pub async fn delete(&self, serial_number: i64) -> AppResult<Book> {
        let book = self
            .repository
            .books_delete(serial_number)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;
        tracing::info!(serial_number, "book deleted");
        Ok(book)
    }

    /// Borrow or return a book. Borrowing stamps today's date.
    pub async fn set_borrow_state(&self, serial_number: i64, state: BorrowState) -> AppResult<Book> {
        let book = self
            .repository
            .books_set_borrow_state(serial_number, state, Self::today())
            .await?
            .ok_or_else(|| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;

        match state {
            BorrowState::Borrowed { by } => {
                tracing::info!(serial_number, borrowed_by = by, "book borrowed")
            }
            BorrowState::Available => tracing::info!(serial_number, "book returned"),
        }
        Ok(book)
    }
}
