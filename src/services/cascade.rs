//! Status cascade from catalog containers down to books and copies

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookStatusReport,
        catalog::{CascadeReport, ContainerKind, ContainerRow},
        status::{CatalogStatus, CopyStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CascadeService {
    repository: Repository,
}

impl CascadeService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a container's current status
    pub async fn get_container(&self, kind: ContainerKind, id: i64) -> AppResult<ContainerRow> {
        self.repository.catalog.get(kind, id).await
    }

    /// Set a container's status and propagate it to the books it owns.
    ///
    /// Each owned book ends at the most restrictive status among all of its
    /// owners. Copies are left alone.
    pub async fn set_container_status(
        &self,
        kind: ContainerKind,
        id: i64,
        status: CatalogStatus,
    ) -> AppResult<CascadeReport> {
        let catalog = &self.repository.catalog;
        let mut tx = self.repository.begin().await?;

        let row = catalog.lock(&mut tx, kind, id).await?;

        if status == CatalogStatus::InActive && kind.guards_active_books() {
            let active = catalog.count_active_books(&mut tx, kind, id).await?;
            if active > 0 {
                tracing::warn!(
                    "Refusing to deactivate {} {}: {} active books",
                    kind, id, active
                );
                return Err(AppError::Conflict(format!(
                    "{} still holds {} active books",
                    kind.label(),
                    active
                )));
            }
        }

        if row.status != status {
            catalog.update_status(&mut tx, kind, &row, status).await?;
        }

        let subcategories_updated = if kind == ContainerKind::Category {
            catalog
                .update_subcategories_of_category(&mut tx, id, status)
                .await?
        } else {
            0
        };

        let mut books_updated = 0;
        if kind.cascades_to_books() {
            for book_id in catalog.owned_book_ids(&mut tx, kind, id).await? {
                let book = self.repository.books.lock(&mut tx, book_id).await?;
                let owners = catalog.owner_statuses(&mut tx, book_id).await?;
                let resolved = resolve_book_status(status, &owners);
                if book.status != resolved {
                    self.repository
                        .books
                        .update_status(&mut tx, &book, resolved)
                        .await?;
                    books_updated += 1;
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            "{} {} set to {} ({} subcategories, {} books updated)",
            kind, id, status, subcategories_updated, books_updated
        );

        Ok(CascadeReport {
            kind,
            id,
            status,
            subcategories_updated,
            books_updated,
        })
    }

    /// Set a book's status and relabel every one of its copies.
    ///
    /// Borrowed copies are relabeled too; their open loans stay open.
    pub async fn set_book_status(
        &self,
        book_id: i64,
        status: CatalogStatus,
    ) -> AppResult<BookStatusReport> {
        let books = &self.repository.books;
        let mut tx = self.repository.begin().await?;

        let book = books.lock(&mut tx, book_id).await?;
        if book.status != status {
            books.update_status(&mut tx, &book, status).await?;
        }

        let copies_updated = books
            .set_copy_statuses(&mut tx, book_id, CopyStatus::from(status))
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Book {} set to {} ({} copies relabeled)",
            book_id, status, copies_updated
        );

        Ok(BookStatusReport {
            book_id,
            status,
            copies_updated,
        })
    }
}

/// Status a book takes after one of its owners changed to `changed`.
///
/// `owners` holds the statuses of all owners as currently stored; the
/// stricter of those and `changed` wins (Banned > InActive > Active).
pub fn resolve_book_status(changed: CatalogStatus, owners: &[CatalogStatus]) -> CatalogStatus {
    owners
        .iter()
        .fold(changed, |acc, owner| acc.most_restrictive(*owner))
}
