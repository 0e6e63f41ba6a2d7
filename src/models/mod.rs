//! Data models for circulation

pub mod book;
pub mod catalog;
pub mod loan;
pub mod penalty;
pub mod people;
pub mod status;

// Re-export commonly used types
pub use book::{Book, BookCopy, BookDetails, CopyCounts};
pub use catalog::{CascadeReport, ContainerKind};
pub use loan::{Loan, LoanDetails, LoanTransaction};
pub use penalty::Penalty;
pub use people::{Employee, Member};
pub use status::{CatalogStatus, CopyStatus, LoanStatus, PenaltyType};
