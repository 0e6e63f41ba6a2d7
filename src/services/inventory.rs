//! Book acquisition and copy inventory

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookCopy, BookDetails, CopyAdjustmentReport, CreateBook},
    repository::Repository,
};

/// What an adjustment does to a book's active copies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPlan {
    Add(i64),
    Retire(i64),
    Unchanged,
}

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
    shelf_capacity: i64,
}

impl InventoryService {
    pub fn new(repository: Repository, shelf_capacity: i64) -> Self {
        Self {
            repository,
            shelf_capacity,
        }
    }

    /// Get a book with its copy counts
    pub async fn get_book(&self, id: i64) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let copies = self
            .repository
            .books
            .copy_counts(&self.repository.pool, id)
            .await?;
        Ok(BookDetails { book, copies })
    }

    /// List all copies of a book
    pub async fn list_copies(&self, book_id: i64) -> AppResult<Vec<BookCopy>> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.books.list_copies(book_id).await
    }

    /// Register a new book with its initial copies.
    ///
    /// The target location is locked for the whole transaction so two
    /// acquisitions cannot both squeeze under the shelf capacity.
    pub async fn create_book(&self, request: CreateBook) -> AppResult<BookDetails> {
        request.validate()?;

        let books = &self.repository.books;
        let mut tx = self.repository.begin().await?;

        if books.isbn_exists(&mut tx, &request.isbn).await? {
            tracing::warn!("Rejected duplicate ISBN {}", request.isbn);
            return Err(AppError::Conflict(
                "The book with the specified ISBN is already in the database".to_string(),
            ));
        }

        if let Some(location_id) = request.location_id {
            if books.lock_location(&mut tx, location_id).await?.is_none() {
                return Err(AppError::NotFound("Location not found".to_string()));
            }
            let shelved = books
                .count_active_copies_at_location(&mut tx, location_id)
                .await?;
            if let Err(e) = check_shelf_capacity(shelved, self.shelf_capacity) {
                tracing::warn!(
                    "Location {} is full ({} active copies)",
                    location_id,
                    shelved
                );
                return Err(e);
            }
        }

        let book = books.insert(&mut tx, &request).await?;
        books
            .insert_copies(&mut tx, book.id, i64::from(request.copy_count))
            .await?;
        let copies = books.copy_counts(&mut *tx, book.id).await?;

        tx.commit().await?;

        tracing::info!(
            "Book {} ({}) created with {} copies",
            book.id,
            book.isbn,
            copies.total()
        );
        Ok(BookDetails { book, copies })
    }

    /// Acquire (`delta > 0`) or retire (`delta < 0`) copies of a book.
    ///
    /// Only active copies are retired; borrowed ones are never touched.
    pub async fn adjust_copies(&self, book_id: i64, delta: i16) -> AppResult<CopyAdjustmentReport> {
        let books = &self.repository.books;
        let mut tx = self.repository.begin().await?;

        books.lock(&mut tx, book_id).await?;
        let before = books.copy_counts(&mut *tx, book_id).await?;

        let (added, retired) = match plan_adjustment(before.active, delta)? {
            CopyPlan::Add(n) => (books.insert_copies(&mut tx, book_id, n).await?, 0),
            CopyPlan::Retire(n) => (0, books.retire_active_copies(&mut tx, book_id, n).await?),
            CopyPlan::Unchanged => (0, 0),
        };

        let copies = books.copy_counts(&mut *tx, book_id).await?;
        tx.commit().await?;

        tracing::info!(
            "Book {} copies adjusted by {} (+{} / -{})",
            book_id,
            delta,
            added,
            retired
        );

        Ok(CopyAdjustmentReport {
            book_id,
            added: added as i64,
            retired: retired as i64,
            copies,
        })
    }
}

/// Decide how to apply `delta` to a book that has `active` active copies
pub fn plan_adjustment(active: i64, delta: i16) -> AppResult<CopyPlan> {
    let delta = i64::from(delta);
    if delta == 0 {
        Ok(CopyPlan::Unchanged)
    } else if delta > 0 {
        Ok(CopyPlan::Add(delta))
    } else if active + delta < 0 {
        Err(AppError::Conflict("Not enough copies available".to_string()))
    } else {
        Ok(CopyPlan::Retire(-delta))
    }
}

/// Reject shelving when a location already holds `capacity` active copies
pub fn check_shelf_capacity(shelved: i64, capacity: i64) -> AppResult<()> {
    if shelved >= capacity {
        Err(AppError::Conflict(format!(
            "The location is full ({} of {} copies)",
            shelved, capacity
        )))
    } else {
        Ok(())
    }
}
