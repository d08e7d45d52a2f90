//! Book domain methods on Repository

use chrono::NaiveDate;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BorrowState, NewBook},
};

pub const DUPLICATE_SERIAL: &str = "Book with this serial number already exists";

impl Repository {
    /// List all books in insertion order
    pub async fn books_list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get a book by serial number
    pub async fn books_find_by_serial(&self, serial_number: i64) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE serial_number = ?")
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a book. The unique index on `serial_number` decides
    /// duplicates, so concurrent creates never need a read-then-write lock.
    pub async fn books_create(&self, data: &NewBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (serial_number, title, author, is_borrowed, borrowed_by, borrowed_date)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.serial_number)
        .bind(&data.title)
        .bind(&data.author)
        .bind(data.is_borrowed)
        .bind(data.borrowed_by)
        .bind(data.borrowed_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(DUPLICATE_SERIAL.to_string())
            }
            other => AppError::Database(other),
        })
    }

    /// Delete a book, returning the row as it was before deletion
    pub async fn books_delete(&self, serial_number: i64) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>("DELETE FROM books WHERE serial_number = ? RETURNING *")
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Apply a borrow or return transition
    pub async fn books_set_borrow_state(
        &self,
        serial_number: i64,
        state: BorrowState,
        today: NaiveDate,
    ) -> AppResult<Option<Book>> {
        let (is_borrowed, borrowed_by, borrowed_date) = match state {
            BorrowState::Borrowed { by } => (true, Some(by), Some(today)),
            BorrowState::Available => (false, None, None),
        };

        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET is_borrowed = ?, borrowed_by = ?, borrowed_date = ?
            WHERE serial_number = ?
            RETURNING *
            "#,
        )
        .bind(is_borrowed)
        .bind(borrowed_by)
        .bind(borrowed_date)
        .bind(serial_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
