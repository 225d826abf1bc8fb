//! HTTP surface: the books router, API docs and the server loop.

pub mod docs;
pub mod http;
pub mod routes;

pub use http::HttpServer;
pub use routes::{ApiError, AppState, router};
