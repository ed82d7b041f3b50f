//! Types for the PDF catalogue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A catalogued PDF document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfEntry {
    /// Store-assigned identity.
    pub id: i64,
    pub title: String,
    pub category: String,
    pub drive_link: Option<String>,
    pub maketou_link: Option<String>,
    pub youtube_link: Option<String>,
    pub tiktok_link: Option<String>,
    pub facebook_link: Option<String>,
    /// Cover image URL.
    pub image_url: String,
    /// Set by the store to the creation time.
    pub published_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating an entry.
///
/// Required fields are optional here on purpose: a missing `title`,
/// `category` or `image_url` is left for the store's NOT NULL constraints
/// to reject, and that rejection is what the caller sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPdfEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub drive_link: Option<String>,
    #[serde(default)]
    pub maketou_link: Option<String>,
    #[serde(default)]
    pub youtube_link: Option<String>,
    #[serde(default)]
    pub tiktok_link: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewPdfEntry {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            category: Some(category.into()),
            image_url: Some(image_url.into()),
            ..Default::default()
        }
    }

    pub fn with_drive_link(mut self, link: impl Into<String>) -> Self {
        self.drive_link = Some(link.into());
        self
    }

    pub fn with_maketou_link(mut self, link: impl Into<String>) -> Self {
        self.maketou_link = Some(link.into());
        self
    }

    pub fn with_youtube_link(mut self, link: impl Into<String>) -> Self {
        self.youtube_link = Some(link.into());
        self
    }

    pub fn with_tiktok_link(mut self, link: impl Into<String>) -> Self {
        self.tiktok_link = Some(link.into());
        self
    }

    pub fn with_facebook_link(mut self, link: impl Into<String>) -> Self {
        self.facebook_link = Some(link.into());
        self
    }

    /// Empty link strings become `None` so they are stored as NULL.
    pub fn normalized(self) -> Self {
        Self {
            drive_link: non_empty(self.drive_link),
            maketou_link: non_empty(self.maketou_link),
            youtube_link: non_empty(self.youtube_link),
            tiktok_link: non_empty(self.tiktok_link),
            facebook_link: non_empty(self.facebook_link),
            ..self
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Catalogue errors.
///
/// The message is the store's own text, unprefixed, because create and
/// delete relay it to the caller verbatim.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Database(String),
}
