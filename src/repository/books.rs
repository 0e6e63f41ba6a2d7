//! Books and copies repository

use sqlx::{PgConnection, PgExecutor, Pool, Postgres};

use super::lost_update;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookCopy, CopyCounts, CreateBook},
        status::{CatalogStatus, CopyStatus},
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by ID and lock it until the transaction ends
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    pub async fn isbn_exists(&self, conn: &mut PgConnection, isbn: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
            .bind(isbn)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }

    /// Insert a book with its author, language and subcategory links
    pub async fn insert(&self, conn: &mut PgConnection, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, title, page_count, publishing_year, description,
                               print_count, status, publisher_id, location_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(book.page_count)
        .bind(book.publishing_year)
        .bind(&book.description)
        .bind(book.print_count)
        .bind(CatalogStatus::Active)
        .bind(book.publisher_id)
        .bind(book.location_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match AppError::on_foreign_key_violation(e, "Publisher not found") {
            AppError::Database(e) => AppError::on_unique_violation(
                e,
                "The book with the specified ISBN is already in the database",
            ),
            other => other,
        })?;

        if !book.author_ids.is_empty() {
            sqlx::query(
                "INSERT INTO author_books (book_id, author_id) SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
            )
            .bind(created.id)
            .bind(&book.author_ids)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::on_foreign_key_violation(e, "Author not found"))?;
        }

        if !book.language_ids.is_empty() {
            sqlx::query(
                "INSERT INTO book_languages (book_id, language_id) SELECT $1, UNNEST($2::SMALLINT[]) ON CONFLICT DO NOTHING",
            )
            .bind(created.id)
            .bind(&book.language_ids)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::on_foreign_key_violation(e, "Language not found"))?;
        }

        if !book.subcategory_ids.is_empty() {
            sqlx::query(
                "INSERT INTO book_subcategories (book_id, subcategory_id) SELECT $1, UNNEST($2::SMALLINT[]) ON CONFLICT DO NOTHING",
            )
            .bind(created.id)
            .bind(&book.subcategory_ids)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::on_foreign_key_violation(e, "Subcategory not found"))?;
        }

        Ok(created)
    }

    /// Update a book's status, failing if the row changed since `book` was read
    pub async fn update_status(
        &self,
        conn: &mut PgConnection,
        book: &Book,
        status: CatalogStatus,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE books SET status = $2, row_version = row_version + 1 WHERE id = $1 AND row_version = $3",
        )
        .bind(book.id)
        .bind(status)
        .bind(book.row_version)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(lost_update(conn, "books", book.id, "Book").await);
        }
        Ok(())
    }

    // ---- Copies ----

    /// List all copies of a book
    pub async fn list_copies(&self, book_id: i64) -> AppResult<Vec<BookCopy>> {
        let copies = sqlx::query_as::<_, BookCopy>(
            "SELECT * FROM book_copies WHERE book_id = $1 ORDER BY id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    /// Count copies of a book per status
    pub async fn copy_counts<'e, E>(&self, executor: E, book_id: i64) -> AppResult<CopyCounts>
    where
        E: PgExecutor<'e>,
    {
        let counts = sqlx::query_as::<_, CopyCounts>(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'Active')   AS active,
                   COUNT(*) FILTER (WHERE status = 'Borrowed') AS borrowed,
                   COUNT(*) FILTER (WHERE status = 'InActive') AS inactive,
                   COUNT(*) FILTER (WHERE status = 'Banned')   AS banned
            FROM book_copies
            WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .fetch_one(executor)
        .await?;
        Ok(counts)
    }

    /// Create `count` new active copies of a book
    pub async fn insert_copies(
        &self,
        conn: &mut PgConnection,
        book_id: i64,
        count: i64,
    ) -> AppResult<u64> {
        if count <= 0 {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO book_copies (book_id, status) SELECT $1, $2 FROM generate_series(1, $3)",
        )
        .bind(book_id)
        .bind(CopyStatus::Active)
        .bind(count)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Flip up to `count` active copies to InActive, most recently acquired first
    pub async fn retire_active_copies(
        &self,
        conn: &mut PgConnection,
        book_id: i64,
        count: i64,
    ) -> AppResult<u64> {
        if count <= 0 {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"
            UPDATE book_copies
            SET status = $3, row_version = row_version + 1
            WHERE id IN (
                SELECT id FROM book_copies
                WHERE book_id = $1 AND status = $4
                ORDER BY id DESC
                LIMIT $2
                FOR UPDATE
            )
            "#,
        )
        .bind(book_id)
        .bind(count)
        .bind(CopyStatus::InActive)
        .bind(CopyStatus::Active)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Relabel every copy of a book, borrowed ones included
    pub async fn set_copy_statuses(
        &self,
        conn: &mut PgConnection,
        book_id: i64,
        status: CopyStatus,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE book_copies SET status = $2, row_version = row_version + 1 WHERE book_id = $1 AND status <> $2",
        )
        .bind(book_id)
        .bind(status)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    // ---- Locations ----

    /// Lock a location row so concurrent shelvings are serialized.
    /// Returns `None` if the location does not exist.
    pub async fn lock_location(
        &self,
        conn: &mut PgConnection,
        location_id: i32,
    ) -> AppResult<Option<CatalogStatus>> {
        let status = sqlx::query_scalar::<_, CatalogStatus>(
            "SELECT status FROM locations WHERE id = $1 FOR UPDATE",
        )
        .bind(location_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(status)
    }

    /// Count active copies shelved at a location, across all books
    pub async fn count_active_copies_at_location(
        &self,
        conn: &mut PgConnection,
        location_id: i32,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM book_copies bc
            JOIN books b ON b.id = bc.book_id
            WHERE b.location_id = $1 AND bc.status = $2
            "#,
        )
        .bind(location_id)
        .bind(CopyStatus::Active)
        .fetch_one(&mut *conn)
        .await?;
        Ok(count)
    }
}
