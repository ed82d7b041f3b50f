//! SQLite-backed PDF catalogue implementation.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use super::{CatalogError, NewPdfEntry, PdfCatalog, PdfEntry};
use crate::metrics::{CATALOG_OPERATIONS, CATALOG_OPERATION_DURATION};

const ENTRY_COLUMNS: &str = "id, title, category, drive_link, maketou_link, youtube_link, \
                             tiktok_link, facebook_link, image_url, published_at";

/// SQLite-backed PDF catalogue.
///
/// Calls run on the blocking thread pool so request handlers only suspend
/// while the statement executes.
pub struct SqlitePdfCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePdfCatalog {
    /// Open (or create) the database file and its schema.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory SQLite catalogue (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pdfs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                category TEXT NOT NULL,
                drive_link TEXT,
                maketou_link TEXT,
                youtube_link TEXT,
                tiktok_link TEXT,
                facebook_link TEXT,
                image_url TEXT NOT NULL,
                published_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_pdfs_published_at ON pdfs(published_at);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    /// Run `op` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, operation: &'static str, op: F) -> Result<T, CatalogError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, CatalogError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let start = Instant::now();

        let result = tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| CatalogError::Database("catalog connection poisoned".to_string()))?;
            op(&conn)
        })
        .await
        .map_err(|e| CatalogError::Database(e.to_string()))
        .and_then(|inner| inner);

        CATALOG_OPERATION_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
        CATALOG_OPERATIONS
            .with_label_values(&[operation, if result.is_ok() { "success" } else { "error" }])
            .inc();

        result
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<PdfEntry> {
        let published_at_str: String = row.get(9)?;
        let published_at = DateTime::parse_from_rfc3339(&published_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    9,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(PdfEntry {
            id: row.get(0)?,
            title: row.get(1)?,
            category: row.get(2)?,
            drive_link: row.get(3)?,
            maketou_link: row.get(4)?,
            youtube_link: row.get(5)?,
            tiktok_link: row.get(6)?,
            facebook_link: row.get(7)?,
            image_url: row.get(8)?,
            published_at,
        })
    }
}

/// Fixed-width timestamps keep text ordering identical to time ordering.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl PdfCatalog for SqlitePdfCatalog {
    async fn list(&self) -> Result<Vec<PdfEntry>, CatalogError> {
        self.with_conn("list", |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM pdfs ORDER BY published_at DESC, id DESC",
                    ENTRY_COLUMNS
                ))
                .map_err(|e| CatalogError::Database(e.to_string()))?;

            let rows = stmt
                .query_map([], Self::row_to_entry)
                .map_err(|e| CatalogError::Database(e.to_string()))?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
            }
            Ok(entries)
        })
        .await
    }

    async fn create(&self, entry: NewPdfEntry) -> Result<PdfEntry, CatalogError> {
        let entry = entry.normalized();
        let published_at = format_timestamp(Utc::now());

        let created = self
            .with_conn("create", move |conn| {
                conn.query_row(
                    &format!(
                        "INSERT INTO pdfs (title, category, drive_link, maketou_link, youtube_link,
                                           tiktok_link, facebook_link, image_url, published_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                         RETURNING {}",
                        ENTRY_COLUMNS
                    ),
                    params![
                        entry.title,
                        entry.category,
                        entry.drive_link,
                        entry.maketou_link,
                        entry.youtube_link,
                        entry.tiktok_link,
                        entry.facebook_link,
                        entry.image_url,
                        published_at,
                    ],
                    Self::row_to_entry,
                )
                .map_err(|e| CatalogError::Database(e.to_string()))
            })
            .await?;

        debug!(id = created.id, title = %created.title, "Created catalog entry");
        Ok(created)
    }

    async fn delete(&self, id: i64) -> Result<usize, CatalogError> {
        let removed = self
            .with_conn("delete", move |conn| {
                conn.execute("DELETE FROM pdfs WHERE id = ?1", params![id])
                    .map_err(|e| CatalogError::Database(e.to_string()))
            })
            .await?;

        debug!(id, removed, "Deleted catalog entry");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    fn create_test_catalog() -> SqlitePdfCatalog {
        SqlitePdfCatalog::in_memory().unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let catalog = create_test_catalog();
        let before = Utc::now().trunc_subsecs(6);

        let created = catalog
            .create(NewPdfEntry::new("Title", "Category", "http://x/y.png"))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.title, "Title");
        assert_eq!(created.category, "Category");
        assert_eq!(created.image_url, "http://x/y.png");
        assert!(created.published_at >= before);
    }

    #[tokio::test]
    async fn test_create_stores_missing_links_as_null() {
        let catalog = create_test_catalog();

        catalog
            .create(NewPdfEntry::new("T", "C", "u").with_tiktok_link(""))
            .await
            .unwrap();

        let entries = catalog.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].drive_link, None);
        assert_eq!(entries[0].maketou_link, None);
        assert_eq!(entries[0].youtube_link, None);
        assert_eq!(entries[0].tiktok_link, None);
        assert_eq!(entries[0].facebook_link, None);
    }

    #[tokio::test]
    async fn test_create_keeps_provided_links() {
        let catalog = create_test_catalog();

        let created = catalog
            .create(
                NewPdfEntry::new("T", "C", "u")
                    .with_drive_link("https://drive/x")
                    .with_facebook_link("https://fb/x"),
            )
            .await
            .unwrap();

        assert_eq!(created.drive_link.as_deref(), Some("https://drive/x"));
        assert_eq!(created.facebook_link.as_deref(), Some("https://fb/x"));
    }

    #[tokio::test]
    async fn test_create_missing_title_surfaces_constraint_error() {
        let catalog = create_test_catalog();
        let entry = NewPdfEntry {
            title: None,
            ..NewPdfEntry::new("ignored", "C", "u")
        };

        let err = catalog.create(entry).await.unwrap_err();

        assert!(err.to_string().contains("NOT NULL constraint failed: pdfs.title"));
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let catalog = create_test_catalog();

        for title in ["A", "B", "C"] {
            catalog
                .create(NewPdfEntry::new(title, "cat", "u"))
                .await
                .unwrap();
        }

        let titles: Vec<String> = catalog
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let catalog = create_test_catalog();
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let catalog = create_test_catalog();
        let created = catalog
            .create(NewPdfEntry::new("T", "C", "u"))
            .await
            .unwrap();

        let removed = catalog.delete(created.id).await.unwrap();

        assert_eq!(removed, 1);
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_an_error() {
        let catalog = create_test_catalog();
        let removed = catalog.delete(4242).await.unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.db");

        {
            let catalog = SqlitePdfCatalog::new(&path).unwrap();
            catalog
                .create(NewPdfEntry::new("Persisted", "C", "u"))
                .await
                .unwrap();
        }

        let reopened = SqlitePdfCatalog::new(&path).unwrap();
        let entries = reopened.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Persisted");
    }

    #[test]
    fn test_format_timestamp_is_fixed_width() {
        let a = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let b = DateTime::parse_from_rfc3339("2024-01-01T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(format_timestamp(a).len(), format_timestamp(b).len());
        assert!(format_timestamp(a) < format_timestamp(b));
    }
}
