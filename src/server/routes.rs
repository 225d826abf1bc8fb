//! HTTP routes for the books API.

use crate::db::{Backend, BookQueries, ConnectionState, Database, PgBackend, Queries};
use crate::error::DbError;
use crate::models::{BookDto, CreateBookRequest, ListBooksQuery};
use crate::server::docs;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Shared handler state.
pub struct AppState<B: Backend = PgBackend, Q = Queries> {
    pub db: Arc<Database<B, Q>>,
}

impl<B: Backend, Q> AppState<B, Q> {
    pub fn new(db: Arc<Database<B, Q>>) -> Self {
        Self { db }
    }
}

impl<B: Backend, Q> Clone for AppState<B, Q> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

/// Build the application router.
pub fn router<B, Q>(state: AppState<B, Q>) -> Router
where
    B: Backend,
    Q: BookQueries<Backend = B>,
{
    Router::new()
        .route(
            "/api/v1/books",
            get(list_books::<B, Q>).post(create_book::<B, Q>),
        )
        .route("/api/v1/books/{id}", get(get_book::<B, Q>))
        .route("/health", get(health::<B, Q>))
        .route("/docs", get(docs::docs))
        .route("/openapi.yaml", get(docs::openapi_document))
        .with_state(state)
}

/// Error returned from handlers, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(pub DbError);

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.root() {
            DbError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            DbError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            // Log the actual error, return generic message
            error!(error = %self.0, "Request failed");
            "internal server error".to_string()
        } else {
            self.0.root().to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// `POST /api/v1/books`
async fn create_book<B, Q>(
    State(state): State<AppState<B, Q>>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BookDto>)>
where
    B: Backend,
    Q: BookQueries<Backend = B>,
{
    let Json(request) = payload.map_err(|e| DbError::invalid_input(e.body_text()))?;
    let params = request.validate()?;

    let book = state
        .db
        .with_tx(move |q: Q| async move { q.create_book(&params).await }, None)
        .await?;

    Ok((StatusCode::CREATED, Json(book.into())))
}

/// `GET /api/v1/books/{id}`
async fn get_book<B, Q>(
    State(state): State<AppState<B, Q>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<BookDto>>
where
    B: Backend,
    Q: BookQueries<Backend = B>,
{
    let Path(id) = id.map_err(|e| DbError::invalid_input(e.body_text()))?;

    let book = state
        .db
        .with_read_tx(move |q: Q| async move { q.get_book(id).await }, None)
        .await?;

    Ok(Json(book.into()))
}

/// `GET /api/v1/books`
async fn list_books<B, Q>(
    State(state): State<AppState<B, Q>>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<BookDto>>>
where
    B: Backend,
    Q: BookQueries<Backend = B>,
{
    let Query(query) = query.map_err(|e| DbError::invalid_input(e.body_text()))?;
    let limit = query.limit_or_default();
    let offset = query.offset_or_default();

    let books = state
        .db
        .with_read_tx(
            move |q: Q| async move { q.list_books(limit, offset).await },
            None,
        )
        .await?;

    Ok(Json(books.into_iter().map(BookDto::from).collect()))
}

/// `GET /health`
async fn health<B, Q>(State(state): State<AppState<B, Q>>) -> Response
where
    B: Backend,
    Q: BookQueries<Backend = B>,
{
    let db_state = state.db.state();
    let (status, label) = match db_state {
        ConnectionState::Connected => (StatusCode::OK, "healthy"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    (
        status,
        Json(json!({ "status": label, "database": db_state.as_str() })),
    )
        .into_response()
}
