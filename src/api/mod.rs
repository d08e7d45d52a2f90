//! API handlers for Bookshelf REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::Validate;

use crate::{
    error::AppError, models::book::is_six_digit, services::books::BOOK_NOT_FOUND, AppState,
};

/// JSON body that is deserialized and then checked with `validator`.
/// Every failure is reported as a 422.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string counterpart of [`ValidatedJson`]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

/// Six-digit serial number taken from the `{serial_number}` path segment
pub struct SerialPath(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SerialPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        let serial_number: i64 = raw
            .parse()
            .map_err(|_| AppError::Validation(format!("serial_number: '{}' is not a number", raw)))?;

        if !is_six_digit(serial_number) {
            return Err(AppError::Validation(
                "serial_number: Serial number must be a six-digit number".to_string(),
            ));
        }

        Ok(SerialPath(serial_number))
    }
}

/// Lookup key from the `{serial_number}` path segment. A value that cannot
/// name a stored book is reported as a missing book rather than a 422.
pub struct BookKey(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for BookKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound(BOOK_NOT_FOUND.to_string()))?;

        match raw.parse::<i64>() {
            Ok(serial_number) if is_six_digit(serial_number) => Ok(BookKey(serial_number)),
            _ => {
                tracing::debug!(key = %raw, "lookup key cannot name a book");
                Err(AppError::NotFound(BOOK_NOT_FOUND.to_string()))
            }
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        .route("/", get(health::root))
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/", get(books::list_books).post(books::create_book))
        .route(
            "/books/:serial_number",
            get(books::get_book)
                .put(books::update_borrow_state)
                .delete(books::delete_book),
        )
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
