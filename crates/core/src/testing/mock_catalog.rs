//! Mock PDF catalogue for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, NewPdfEntry, PdfCatalog, PdfEntry};

/// Catalogue call recorded for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCatalogCall {
    List,
    Create(NewPdfEntry),
    Delete(i64),
}

/// In-memory implementation of the PdfCatalog trait.
///
/// Behaves like the SQLite store (ids, timestamps, newest-first listing and
/// NOT NULL rejections) and can be told to fail the next call.
#[derive(Debug)]
pub struct MockPdfCatalog {
    entries: Arc<RwLock<Vec<PdfEntry>>>,
    next_id: Arc<RwLock<i64>>,
    calls: Arc<RwLock<Vec<RecordedCatalogCall>>>,
    next_error: Arc<RwLock<Option<CatalogError>>>,
}

impl Default for MockPdfCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPdfCatalog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(RwLock::new(1)),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the next call to fail with the given store message.
    pub async fn set_next_error(&self, message: impl Into<String>) {
        *self.next_error.write().await = Some(CatalogError::Database(message.into()));
    }

    /// Get recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCatalogCall> {
        self.calls.read().await.clone()
    }

    /// Number of calls made, of any kind.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Current contents, in insertion order.
    pub async fn entries(&self) -> Vec<PdfEntry> {
        self.entries.read().await.clone()
    }

    async fn take_error(&self) -> Option<CatalogError> {
        self.next_error.write().await.take()
    }
}

fn required(value: Option<String>, column: &str) -> Result<String, CatalogError> {
    value.ok_or_else(|| {
        CatalogError::Database(format!("NOT NULL constraint failed: pdfs.{}", column))
    })
}

#[async_trait]
impl PdfCatalog for MockPdfCatalog {
    async fn list(&self) -> Result<Vec<PdfEntry>, CatalogError> {
        self.calls.write().await.push(RecordedCatalogCall::List);
        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        let mut entries = self.entries.read().await.clone();
        entries.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    async fn create(&self, entry: NewPdfEntry) -> Result<PdfEntry, CatalogError> {
        self.calls
            .write()
            .await
            .push(RecordedCatalogCall::Create(entry.clone()));
        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        let entry = entry.normalized();
        let title = required(entry.title, "title")?;
        let category = required(entry.category, "category")?;
        let image_url = required(entry.image_url, "image_url")?;

        let mut next_id = self.next_id.write().await;
        let created = PdfEntry {
            id: *next_id,
            title,
            category,
            drive_link: entry.drive_link,
            maketou_link: entry.maketou_link,
            youtube_link: entry.youtube_link,
            tiktok_link: entry.tiktok_link,
            facebook_link: entry.facebook_link,
            image_url,
            published_at: Utc::now(),
        };
        *next_id += 1;

        self.entries.write().await.push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: i64) -> Result<usize, CatalogError> {
        self.calls.write().await.push(RecordedCatalogCall::Delete(id));
        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(before - entries.len())
    }
}
