//! Query executor for the `books` table.
//!
//! [`Queries`] runs each statement either directly on the pool or on the
//! transaction it was rebound to with [`Querier::with_tx`].

use crate::db::backend::{Querier, TxHandle};
use crate::db::postgres::PgBackend;
use crate::error::{DbError, DbResult};
use crate::models::{Book, CreateBookParams};
use futures_util::future::BoxFuture;
use sqlx::PgPool;
use tracing::debug;

const CREATE_BOOK: &str = "INSERT INTO books (title, author, published_date) \
     VALUES ($1, $2, $3) \
     RETURNING id, title, author, published_date";

const GET_BOOK: &str = "SELECT id, title, author, published_date FROM books WHERE id = $1";

const LIST_BOOKS: &str = "SELECT id, title, author, published_date FROM books \
     ORDER BY id \
     LIMIT $1 OFFSET $2";

#[derive(Clone)]
enum Executor {
    Pool(PgPool),
    Tx(TxHandle<PgBackend>),
}

/// Run `$body` with `$conn` bound to whichever executor the querier holds.
///
/// The transaction stays locked only for the duration of `$body`.
macro_rules! with_executor {
    ($executor:expr, $conn:ident => $body:expr) => {
        match $executor {
            Executor::Pool(pool) => {
                let $conn = pool;
                $body
            }
            Executor::Tx(handle) => {
                let mut guard = handle.lock().await?;
                let $conn = &mut **guard;
                $body
            }
        }
    };
}

/// Data operations on the `books` table.
///
/// Futures are boxed so they stay `Send` when the executor holds a locked
/// transaction connection.
pub trait BookQueries: Querier {
    /// Insert a book and return the stored row.
    fn create_book<'a>(&'a self, params: &'a CreateBookParams) -> BoxFuture<'a, DbResult<Book>>;

    /// Fetch a book by id.
    fn get_book(&self, id: i64) -> BoxFuture<'_, DbResult<Book>>;

    /// List books ordered by id.
    fn list_books(&self, limit: i64, offset: i64) -> BoxFuture<'_, DbResult<Vec<Book>>>;
}

/// Book queries, bound to a pool or a transaction.
#[derive(Clone)]
pub struct Queries {
    executor: Executor,
}

impl Queries {
    /// Check whether this executor runs inside a transaction.
    pub fn in_transaction(&self) -> bool {
        matches!(self.executor, Executor::Tx(_))
    }
}

impl BookQueries for Queries {
    fn create_book<'a>(&'a self, params: &'a CreateBookParams) -> BoxFuture<'a, DbResult<Book>> {
        Box::pin(async move {
            let book = with_executor!(&self.executor, conn => {
                sqlx::query_as::<_, Book>(CREATE_BOOK)
                    .bind(&params.title)
                    .bind(&params.author)
                    .bind(params.published_date)
                    .fetch_one(conn)
                    .await
            })?;

            debug!(book_id = book.id, "Book created");
            Ok(book)
        })
    }

    fn get_book(&self, id: i64) -> BoxFuture<'_, DbResult<Book>> {
        Box::pin(async move {
            let book = with_executor!(&self.executor, conn => {
                sqlx::query_as::<_, Book>(GET_BOOK)
                    .bind(id)
                    .fetch_optional(conn)
                    .await
            })?;

            book.ok_or_else(|| DbError::not_found("Book", id))
        })
    }

    fn list_books(&self, limit: i64, offset: i64) -> BoxFuture<'_, DbResult<Vec<Book>>> {
        Box::pin(async move {
            let books = with_executor!(&self.executor, conn => {
                sqlx::query_as::<_, Book>(LIST_BOOKS)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(conn)
                    .await
            })?;

            Ok(books)
        })
    }
}

impl Querier for Queries {
    type Backend = PgBackend;

    fn new(pool: PgPool) -> Self {
        Self {
            executor: Executor::Pool(pool),
        }
    }

    fn with_tx(&self, tx: TxHandle<PgBackend>) -> Self {
        Self {
            executor: Executor::Tx(tx),
        }
    }
}

impl std::fmt::Debug for Queries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queries")
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}
