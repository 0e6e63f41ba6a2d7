//! Catalog container models (categories, subcategories, languages, authors,
//! publishers, locations)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::status::CatalogStatus;

/// Kind of catalog node whose status can be changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Category,
    Subcategory,
    Language,
    Author,
    Publisher,
    Location,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Category => "category",
            ContainerKind::Subcategory => "subcategory",
            ContainerKind::Language => "language",
            ContainerKind::Author => "author",
            ContainerKind::Publisher => "publisher",
            ContainerKind::Location => "location",
        }
    }

    /// Table holding this container's rows
    pub(crate) fn table(&self) -> &'static str {
        match self {
            ContainerKind::Category => "categories",
            ContainerKind::Subcategory => "subcategories",
            ContainerKind::Language => "languages",
            ContainerKind::Author => "authors",
            ContainerKind::Publisher => "publishers",
            ContainerKind::Location => "locations",
        }
    }

    /// Human-readable label used in messages
    pub fn label(&self) -> &'static str {
        match self {
            ContainerKind::Category => "Category",
            ContainerKind::Subcategory => "SubCategory",
            ContainerKind::Language => "Language",
            ContainerKind::Author => "Author",
            ContainerKind::Publisher => "Publisher",
            ContainerKind::Location => "Location",
        }
    }

    /// Whether a status change on this container reaches book status
    pub fn cascades_to_books(&self) -> bool {
        !matches!(self, ContainerKind::Location)
    }

    /// Containers that may not be deactivated while they hold active books
    pub fn guards_active_books(&self) -> bool {
        matches!(self, ContainerKind::Publisher | ContainerKind::Location)
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContainerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category" | "categories" => Ok(ContainerKind::Category),
            "subcategory" | "subcategories" => Ok(ContainerKind::Subcategory),
            "language" | "languages" => Ok(ContainerKind::Language),
            "author" | "authors" => Ok(ContainerKind::Author),
            "publisher" | "publishers" => Ok(ContainerKind::Publisher),
            "location" | "locations" => Ok(ContainerKind::Location),
            _ => Err(format!("Unknown container kind: {}", s)),
        }
    }
}

/// Status row of any container
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ContainerRow {
    pub id: i64,
    pub status: CatalogStatus,
    #[serde(skip)]
    pub row_version: i32,
}

/// Set status request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetStatus {
    pub status: CatalogStatus,
}

/// Result of a status change and its cascade
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CascadeReport {
    pub kind: ContainerKind,
    pub id: i64,
    pub status: CatalogStatus,
    /// Subcategories relabeled together with their category
    pub subcategories_updated: u64,
    pub books_updated: u64,
}
