//! Catalog container repository (status rows and book ownership)

use sqlx::{PgConnection, Pool, Postgres};

use super::lost_update;
use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::{ContainerKind, ContainerRow},
        status::CatalogStatus,
    },
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a container's status row
    pub async fn get(&self, kind: ContainerKind, id: i64) -> AppResult<ContainerRow> {
        let query = format!(
            "SELECT id::BIGINT AS id, status, row_version FROM {} WHERE id = $1",
            kind.table()
        );
        sqlx::query_as::<_, ContainerRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found", kind.label())))
    }

    /// Read a container's status row and lock it until the transaction ends
    pub async fn lock(
        &self,
        conn: &mut PgConnection,
        kind: ContainerKind,
        id: i64,
    ) -> AppResult<ContainerRow> {
        let query = format!(
            "SELECT id::BIGINT AS id, status, row_version FROM {} WHERE id = $1 FOR UPDATE",
            kind.table()
        );
        sqlx::query_as::<_, ContainerRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found", kind.label())))
    }

    /// Set a container's status if its row version is unchanged
    pub async fn update_status(
        &self,
        conn: &mut PgConnection,
        kind: ContainerKind,
        row: &ContainerRow,
        status: CatalogStatus,
    ) -> AppResult<()> {
        let query = format!(
            "UPDATE {} SET status = $2, row_version = row_version + 1 WHERE id = $1 AND row_version = $3",
            kind.table()
        );
        let result = sqlx::query(&query)
            .bind(row.id)
            .bind(status)
            .bind(row.row_version)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(lost_update(conn, kind.table(), row.id, kind.label()).await);
        }
        Ok(())
    }

    /// Relabel every subcategory of a category
    pub async fn update_subcategories_of_category(
        &self,
        conn: &mut PgConnection,
        category_id: i64,
        status: CatalogStatus,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE subcategories
            SET status = $2, row_version = row_version + 1
            WHERE category_id = $1 AND status <> $2
            "#,
        )
        .bind(category_id)
        .bind(status)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Count active books held by a publisher or a location
    pub async fn count_active_books(
        &self,
        conn: &mut PgConnection,
        kind: ContainerKind,
        id: i64,
    ) -> AppResult<i64> {
        let column = match kind {
            ContainerKind::Publisher => "publisher_id",
            ContainerKind::Location => "location_id",
            other => {
                return Err(AppError::Internal(format!(
                    "{} does not hold books directly",
                    other.label()
                )))
            }
        };
        let query = format!(
            "SELECT COUNT(*) FROM books WHERE {} = $1 AND status = $2",
            column
        );
        let count: i64 = sqlx::query_scalar(&query)
            .bind(id)
            .bind(CatalogStatus::Active)
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    /// Ids of the books owned by a container, in ascending order.
    ///
    /// A category owns the books of its subcategories.
    pub async fn owned_book_ids(
        &self,
        conn: &mut PgConnection,
        kind: ContainerKind,
        id: i64,
    ) -> AppResult<Vec<i64>> {
        let query = match kind {
            ContainerKind::Category => {
                r#"
                SELECT DISTINCT bs.book_id
                FROM book_subcategories bs
                JOIN subcategories s ON s.id = bs.subcategory_id
                WHERE s.category_id = $1
                ORDER BY bs.book_id
                "#
            }
            ContainerKind::Subcategory => {
                "SELECT book_id FROM book_subcategories WHERE subcategory_id = $1 ORDER BY book_id"
            }
            ContainerKind::Language => {
                "SELECT book_id FROM book_languages WHERE language_id = $1 ORDER BY book_id"
            }
            ContainerKind::Author => {
                "SELECT book_id FROM author_books WHERE author_id = $1 ORDER BY book_id"
            }
            ContainerKind::Publisher => "SELECT id FROM books WHERE publisher_id = $1 ORDER BY id",
            ContainerKind::Location => "SELECT id FROM books WHERE location_id = $1 ORDER BY id",
        };
        let ids = sqlx::query_scalar::<_, i64>(query)
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(ids)
    }

    /// Statuses of every container owning a book (subcategories, languages,
    /// authors and publisher)
    pub async fn owner_statuses(
        &self,
        conn: &mut PgConnection,
        book_id: i64,
    ) -> AppResult<Vec<CatalogStatus>> {
        let statuses = sqlx::query_scalar::<_, CatalogStatus>(
            r#"
            SELECT s.status FROM subcategories s
            JOIN book_subcategories bs ON bs.subcategory_id = s.id
            WHERE bs.book_id = $1
            UNION ALL
            SELECT l.status FROM languages l
            JOIN book_languages bl ON bl.language_id = l.id
            WHERE bl.book_id = $1
            UNION ALL
            SELECT a.status FROM authors a
            JOIN author_books ab ON ab.author_id = a.id
            WHERE ab.book_id = $1
            UNION ALL
            SELECT p.status FROM publishers p
            JOIN books b ON b.publisher_id = p.id
            WHERE b.id = $1
            "#,
        )
        .bind(book_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(statuses)
    }
}
