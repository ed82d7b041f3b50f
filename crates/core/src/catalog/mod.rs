//! PDF catalogue - the relational store behind `/api/pdfs`.
//!
//! The store owns id and timestamp assignment; callers never cache entries
//! between requests.

mod sqlite;
mod types;

pub use sqlite::SqlitePdfCatalog;
pub use types::*;

use async_trait::async_trait;

/// Trait for PDF catalogue storage.
#[async_trait]
pub trait PdfCatalog: Send + Sync {
    /// Every entry, newest `published_at` first.
    async fn list(&self) -> Result<Vec<PdfEntry>, CatalogError>;

    /// Insert an entry and return the stored row, including the assigned
    /// `id` and `published_at`.
    async fn create(&self, entry: NewPdfEntry) -> Result<PdfEntry, CatalogError>;

    /// Delete by id. Returns the number of rows removed (0 or 1); an absent
    /// id is not an error.
    async fn delete(&self, id: i64) -> Result<usize, CatalogError>;
}
