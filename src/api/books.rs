//! Book endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::book::{Book, BorrowStateQuery, CreateBook},
    AppState,
};

use super::{BookKey, SerialPath, ValidatedJson, ValidatedQuery};

/// List all books
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get a book by serial number
#[utoipa::path(
    get,
    path = "/books/{serial_number}",
    tag = "books",
    params(("serial_number" = i64, Path, description = "Six-digit serial number")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    BookKey(serial_number): BookKey,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(serial_number).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books/",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 200, description = "Book created", body = Book),
        (status = 400, description = "Serial number already exists", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<CreateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.create(data).await?;
    Ok(Json(book))
}

/// Borrow or return a book
#[utoipa::path(
    put,
    path = "/books/{serial_number}",
    tag = "books",
    params(
        ("serial_number" = i64, Path, description = "Six-digit serial number"),
        BorrowStateQuery
    ),
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_borrow_state(
    State(state): State<AppState>,
    SerialPath(serial_number): SerialPath,
    ValidatedQuery(query): ValidatedQuery<BorrowStateQuery>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .set_borrow_state(serial_number, query.into_state()?)
        .await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{serial_number}",
    tag = "books",
    params(("serial_number" = i64, Path, description = "Six-digit serial number")),
    responses(
        (status = 200, description = "Deleted book", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    BookKey(serial_number): BookKey,
) -> AppResult<Json<Book>> {
    let book = state.services.books.delete(serial_number).await?;
    Ok(Json(book))
}
