//! Repository layer for database operations
//!
//! Reads go straight to the pool. Writes that must commit together take a
//! `&mut PgConnection` borrowed from a transaction opened by the service.

pub mod books;
pub mod catalog;
pub mod loans;
pub mod penalties;
pub mod people;

use sqlx::{PgConnection, Pool, Postgres, Transaction};

use crate::error::{AppError, AppResult};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub catalog: catalog::CatalogRepository,
    pub loans: loans::LoansRepository,
    pub penalties: penalties::PenaltiesRepository,
    pub people: people::PeopleRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            catalog: catalog::CatalogRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            penalties: penalties::PenaltiesRepository::new(pool.clone()),
            people: people::PeopleRepository::new(pool.clone()),
            pool,
        }
    }

    /// Start a transaction; dropping it without commit rolls everything back
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Explain an optimistic update that matched no row.
///
/// The row is either gone (NotFound) or was rewritten by someone else since it
/// was read (Concurrency, caller may retry).
pub(crate) async fn lost_update(
    conn: &mut PgConnection,
    table: &str,
    id: i64,
    label: &str,
) -> AppError {
    let query = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
    match sqlx::query_scalar::<_, bool>(&query)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
    {
        Ok(true) => AppError::Concurrency(format!(
            "{} {} was modified concurrently, please retry",
            label, id
        )),
        Ok(false) => AppError::NotFound(format!("{} not found", label)),
        Err(e) => AppError::Database(e),
    }
}
