//! Book data models.
//!
//! `Book` mirrors a row of the `books` table; the DTO types are the JSON shapes
//! of the HTTP API, which uses camelCase field names.

use crate::error::{DbError, DbResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum length for title and author, in characters.
pub const MAX_TEXT_FIELD_LEN: usize = 255;

/// Default page size for book listings.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Maximum page size for book listings.
pub const MAX_LIST_LIMIT: i64 = 100;

/// A row of the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub published_date: NaiveDate,
}

/// Parameters for inserting a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookParams {
    pub title: String,
    pub author: String,
    pub published_date: NaiveDate,
}

/// Request body for `POST /api/v1/books`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub published_date: NaiveDate,
}

impl CreateBookRequest {
    /// Validate the request and turn it into insert parameters.
    ///
    /// Title and author are trimmed; both must be non-empty and at most
    /// [`MAX_TEXT_FIELD_LEN`] characters.
    pub fn validate(self) -> DbResult<CreateBookParams> {
        let title = required_text("title", &self.title)?;
        let author = required_text("author", &self.author)?;
        Ok(CreateBookParams {
            title,
            author,
            published_date: self.published_date,
        })
    }
}

fn required_text(field: &str, value: &str) -> DbResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DbError::invalid_input(format!("{} is required", field)));
    }
    if trimmed.chars().count() > MAX_TEXT_FIELD_LEN {
        return Err(DbError::invalid_input(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_FIELD_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Book representation returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub published_date: NaiveDate,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            published_date: book.published_date,
        }
    }
}

/// Query string for `GET /api/v1/books`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBooksQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListBooksQuery {
    /// Page size clamped to `1..=MAX_LIST_LIMIT`.
    pub fn limit_or_default(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }

    pub fn offset_or_default(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, author: &str) -> CreateBookRequest {
        CreateBookRequest {
            title: title.to_string(),
            author: author.to_string(),
            published_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let params = request("  Dune ", " Frank Herbert").validate().unwrap();
        assert_eq!(params.title, "Dune");
        assert_eq!(params.author, "Frank Herbert");
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let err = request("   ", "Frank Herbert").validate().unwrap_err();
        assert!(matches!(err, DbError::InvalidInput { .. }));
        assert!(err.to_string().contains("title is required"));
    }

    #[test]
    fn test_validate_rejects_long_author() {
        let long = "x".repeat(MAX_TEXT_FIELD_LEN + 1);
        let err = request("Dune", &long).validate().unwrap_err();
        assert!(err.to_string().contains("author must be at most 255"));
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let req: CreateBookRequest = serde_json::from_str(
            r#"{"title":"Dune","author":"Frank Herbert","publishedDate":"1965-08-01"}"#,
        )
        .unwrap();
        assert_eq!(req.published_date, NaiveDate::from_ymd_opt(1965, 8, 1).unwrap());
    }

    #[test]
    fn test_request_missing_title_defaults_empty() {
        let req: CreateBookRequest =
            serde_json::from_str(r#"{"author":"Frank Herbert","publishedDate":"1965-08-01"}"#)
                .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_book_dto_serializes_camel_case() {
        let dto = BookDto::from(Book {
            id: 7,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            published_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["publishedDate"], "1965-08-01");
    }

    #[test]
    fn test_list_query_clamps_limit() {
        let query = ListBooksQuery {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(query.limit_or_default(), MAX_LIST_LIMIT);
        assert_eq!(query.offset_or_default(), 0);
        assert_eq!(ListBooksQuery::default().limit_or_default(), DEFAULT_LIST_LIMIT);
    }
}
