//! Shelf Core Library
//!
//! This crate provides the core functionality for Shelf, a book-search
//! companion that keeps a user's favorites, notes, search history,
//! reading states, and profile in a local per-user document store.
//!
//! # Architecture
//!
//! - **Catalog**: Open Library search API behind a small trait; failures
//!   degrade to empty results
//! - **Store**: SQLite-backed document tree keyed by slash-delimited
//!   paths, scoped per user id
//! - **Services**: intent-driven sync services that project every
//!   outcome into observable state slots
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let store = Arc::new(SqliteStore::open(&config)?);
//! let auth = AuthContext::new();
//!
//! let books = BooksService::new(OpenLibrary::new(&config), store, auth);
//! books.search("dune").await;
//!
//! if let FetchState::Success(results) = &*books.subscribe_search().borrow() {
//!     books.toggle_favorite(&results[0]);
//! }
//! ```
//!
//! # Modules
//!
//! - `books`: search, favorites, notes, history, reading state (main entry point)
//! - `profile`: profile document and picture sync
//! - `auth`: local accounts, sessions, and the identity context
//! - `catalog`: Open Library client
//! - `store`: per-user document store over SQLite
//! - `blobs`: local blob storage for uploaded images
//! - `state`: observable state projections shared by the services
//! - `config`: application configuration

pub mod auth;
pub mod blobs;
pub mod books;
pub mod catalog;
pub mod config;
pub mod models;
pub mod profile;
pub mod state;
pub mod store;

pub use auth::{AuthContext, AuthService, Session};
pub use blobs::{BlobStore, FileBlobStore};
pub use books::BooksService;
pub use catalog::{Catalog, OpenLibrary};
pub use config::Config;
pub use models::{Book, FavoriteEntry, ReadingState, SearchHistoryEntry, UserProfile};
pub use profile::{ProfileService, ProfileUpdate};
pub use state::{ActionState, FetchState};
pub use store::{SqliteStore, StoreError, UserStore};
