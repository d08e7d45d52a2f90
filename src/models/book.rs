//! Book record model and request types

use chrono::NaiveDate;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;

/// Lowest accepted six-digit identifier (serial numbers and borrower cards)
pub const SERIAL_MIN: i64 = 100_000;
/// Highest accepted six-digit identifier
pub const SERIAL_MAX: i64 = 999_999;

/// Returns true when `value` is a six-digit identifier.
pub fn is_six_digit(value: i64) -> bool {
    (SERIAL_MIN..=SERIAL_MAX).contains(&value)
}

/// Book record as stored in the `books` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Internal row id
    pub id: i64,
    /// Six-digit serial number, unique across all books
    pub serial_number: i64,
    pub title: String,
    pub author: String,
    pub is_borrowed: bool,
    /// Borrower card number, set only while the book is borrowed
    pub borrowed_by: Option<i64>,
    /// Date of the last transition to borrowed
    pub borrowed_date: Option<NaiveDate>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(range(min = 100000, max = 999999, message = "Serial number must be a six-digit number"))]
    pub serial_number: i64,
    pub title: String,
    pub author: String,
    pub is_borrowed: Option<bool>,
    #[validate(range(min = 100000, max = 999999, message = "Borrower must be a six-digit number"))]
    pub borrowed_by: Option<i64>,
    pub borrowed_date: Option<NaiveDate>,
}

/// Normalized row ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub serial_number: i64,
    pub title: String,
    pub author: String,
    pub is_borrowed: bool,
    pub borrowed_by: Option<i64>,
    pub borrowed_date: Option<NaiveDate>,
}

impl CreateBook {
    /// Build the row to insert, forcing the borrow fields into one of the
    /// two valid states.
    pub fn into_new_book(self, today: NaiveDate) -> Result<NewBook, AppError> {
        let is_borrowed = self.is_borrowed.unwrap_or(false);

        let (borrowed_by, borrowed_date) = if is_borrowed {
            let by = self.borrowed_by.ok_or_else(|| {
                AppError::Validation("borrowed_by is required when is_borrowed is true".to_string())
            })?;
            (Some(by), Some(self.borrowed_date.unwrap_or(today)))
        } else {
            if self.borrowed_by.is_some() || self.borrowed_date.is_some() {
                tracing::debug!(
                    serial_number = self.serial_number,
                    "dropping borrow fields on an available book"
                );
            }
            (None, None)
        };

        Ok(NewBook {
            serial_number: self.serial_number,
            title: self.title,
            author: self.author,
            is_borrowed,
            borrowed_by,
            borrowed_date,
        })
    }
}

/// Query string of `PUT /books/{serial_number}`
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BorrowStateQuery {
    /// New borrowed flag (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`)
    #[serde(deserialize_with = "lenient_bool")]
    pub is_borrowed: bool,
    /// Borrower card number, required when borrowing
    #[validate(range(min = 100000, max = 999999, message = "Borrower must be a six-digit number"))]
    pub borrowed_by: Option<i64>,
}

/// Accepts a real boolean or the usual textual spellings of one, in any case.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientBool;

    impl<'de> de::Visitor<'de> for LenientBool {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean such as true, false, 1, 0, yes, no, on or off")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Unsigned(value), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" | "y" | "on" => Ok(true),
                "false" | "f" | "0" | "no" | "n" | "off" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
            }
        }
    }

    deserializer.deserialize_any(LenientBool)
}

/// Target of a borrow/return transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowState {
    Available,
    Borrowed { by: i64 },
}

impl BorrowStateQuery {
    /// Resolve the query into a transition. A borrower passed along with
    /// `is_borrowed=false` is discarded.
    pub fn into_state(self) -> Result<BorrowState, AppError> {
        match (self.is_borrowed, self.borrowed_by) {
            (true, Some(by)) => Ok(BorrowState::Borrowed { by }),
            (true, None) => Err(AppError::Validation(
                "borrowed_by is required when is_borrowed is true".to_string(),
            )),
            (false, Some(by)) => {
                tracing::debug!(borrowed_by = by, "ignoring borrower on return");
                Ok(BorrowState::Available)
            }
            (false, None) => Ok(BorrowState::Available),
        }
    }
}
