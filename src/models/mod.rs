//! Data models for the books API.
//!
//! This module re-exports all model types used throughout the application.

pub mod book;

pub use book::{
    Book, BookDto, CreateBookParams, CreateBookRequest, DEFAULT_LIST_LIMIT, ListBooksQuery,
    MAX_LIST_LIMIT, MAX_TEXT_FIELD_LEN,
};
