//! Data models for Shelf
//!
//! Defines the entities shared by the catalog client, the document store,
//! and the sync services: Book, FavoriteEntry, SearchHistoryEntry,
//! ReadingState, and UserProfile. Stored documents use camelCase field
//! names, matching the store layout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A book as surfaced by search results and the favorites list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    /// Store-assigned identifier; empty for books fresh from the catalog
    pub id: String,
    /// Catalog-stable key (may contain `/`), the join key against favorites
    pub key: String,
    /// Display title
    pub title: String,
    /// Comma-joined author names, or a placeholder when unknown
    pub author: String,
    /// Cover image URL, empty when the catalog has no cover
    pub cover_url: String,
    /// Short description, or a placeholder when unavailable
    pub description: String,
    /// Whether the book is in the current user's favorites.
    /// Never trusted from the catalog; recomputed at read time.
    pub is_favorite: bool,
}

impl Book {
    /// Create a book with the given key and title, other fields empty
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A favorites-set record: the full book snapshot plus when it was added
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    #[serde(flatten)]
    pub book: Book,
    /// Epoch milliseconds at toggle-to-favorite time
    #[serde(default)]
    pub added_at: i64,
}

impl FavoriteEntry {
    /// Snapshot a book into a favorites record at the given timestamp.
    /// The stored snapshot always carries `isFavorite: true`.
    pub fn new(book: &Book, added_at: i64) -> Self {
        let mut book = book.clone();
        book.is_favorite = true;
        Self { book, added_at }
    }
}

/// One saved search query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchHistoryEntry {
    /// The query text as entered
    pub query: String,
    /// Epoch milliseconds at save time; listing sorts on this, descending
    pub timestamp: i64,
    /// Store-assigned key, duplicated into the record
    pub id: String,
}

/// Per-book reading progress
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReadingState {
    /// Not started yet; also the fallback for absent or unreadable values
    #[default]
    NotStarted,
    /// Currently reading
    Reading,
    /// Finished
    Finished,
}

impl ReadingState {
    /// The stored representation (the variant name)
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingState::NotStarted => "NotStarted",
            ReadingState::Reading => "Reading",
            ReadingState::Finished => "Finished",
        }
    }
}

impl std::fmt::Display for ReadingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user profile document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Authenticated identity id. Overwritten with the session's id on
    /// every read; the stored value is never trusted.
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub second_last_name: String,
    /// Optional ISO date (`YYYY-MM-DD`)
    pub birth_date: Option<NaiveDate>,
    /// Public URL of the profile picture blob, empty when unset
    pub profile_picture_url: String,
}
