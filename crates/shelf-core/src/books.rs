//! Book synchronization
//!
//! [`BooksService`] merges catalog search results with the signed-in
//! user's favorites and drives the notes, search-history, and
//! reading-state flows. Each flow owns one observable state slot; callers
//! issue an intent, then watch the slot. Failures never escape an
//! operation as a raised error: they resolve into the slot (or a `false`
//! return for writes), and absorbed failures are logged at warn level.
//!
//! Identity is resolved through [`AuthContext`] on every call. A missing
//! identity is not a failure: reads resolve to their empty branch and
//! writes return `false` without touching any slot.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::catalog::Catalog;
use crate::models::{Book, FavoriteEntry, ReadingState, SearchHistoryEntry};
use crate::state::{or_default, ActionState, FetchState};
use crate::store::{paths, StoreResult, UserStore};

/// Sync service for search, favorites, notes, history, and reading state
pub struct BooksService<C, S> {
    catalog: C,
    store: Arc<S>,
    auth: AuthContext,
    search: watch::Sender<FetchState<Vec<Book>>>,
    favorites: watch::Sender<FetchState<Vec<Book>>>,
    notes: watch::Sender<String>,
    save_notes: watch::Sender<ActionState>,
    history: watch::Sender<FetchState<Vec<SearchHistoryEntry>>>,
    reading: watch::Sender<ReadingState>,
}

impl<C: Catalog, S: UserStore> BooksService<C, S> {
    pub fn new(catalog: C, store: Arc<S>, auth: AuthContext) -> Self {
        Self {
            catalog,
            store,
            auth,
            search: watch::channel(FetchState::Initial).0,
            favorites: watch::channel(FetchState::Initial).0,
            notes: watch::channel(String::new()).0,
            save_notes: watch::channel(ActionState::Initial).0,
            history: watch::channel(FetchState::Initial).0,
            reading: watch::channel(ReadingState::NotStarted).0,
        }
    }

    /// Observe the search results slot
    pub fn subscribe_search(&self) -> watch::Receiver<FetchState<Vec<Book>>> {
        self.search.subscribe()
    }

    /// Observe the favorites list slot
    pub fn subscribe_favorites(&self) -> watch::Receiver<FetchState<Vec<Book>>> {
        self.favorites.subscribe()
    }

    /// Observe the notes text for the last loaded book
    pub fn subscribe_notes(&self) -> watch::Receiver<String> {
        self.notes.subscribe()
    }

    /// Observe the outcome of the last notes save
    pub fn subscribe_save_notes(&self) -> watch::Receiver<ActionState> {
        self.save_notes.subscribe()
    }

    /// Observe the search history slot
    pub fn subscribe_history(&self) -> watch::Receiver<FetchState<Vec<SearchHistoryEntry>>> {
        self.history.subscribe()
    }

    /// Observe the reading state for the last loaded book
    pub fn subscribe_reading(&self) -> watch::Receiver<ReadingState> {
        self.reading.subscribe()
    }

    /// Search the catalog and cross-reference favorites.
    ///
    /// A blank query resets the slot to Initial without fetching. Catalog
    /// failures resolve to Error; favorites-read failures during the
    /// cross-reference are absorbed as "no favorites".
    pub async fn search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.search.send_replace(FetchState::Initial);
            return;
        }

        self.search.send_replace(FetchState::Loading);
        debug!("searching catalog for {:?}", query);

        match self.catalog.search(query).await {
            Ok(books) => {
                let favorites = self.favorite_keys();
                let books: Vec<Book> = books
                    .into_iter()
                    .map(|mut book| {
                        book.is_favorite = favorites.contains(&book.key);
                        book
                    })
                    .collect();
                self.search.send_replace(FetchState::from_list(books));
            }
            Err(e) => {
                self.search.send_replace(FetchState::Error(e.to_string()));
            }
        }
    }

    /// Load the favorites set for the current identity.
    ///
    /// No identity resolves to Empty, as does a failed read. Every
    /// returned book carries `is_favorite == true`.
    pub fn load_favorites(&self) {
        self.favorites.send_replace(FetchState::Loading);
        let Some(uid) = self.auth.current_uid() else {
            self.favorites.send_replace(FetchState::Empty);
            return;
        };
        let books = self.stored_favorites(&uid);
        self.favorites.send_replace(FetchState::from_list(books));
    }

    /// Flip a book in or out of the favorites set.
    ///
    /// The direction is taken from `book.is_favorite`. On success the
    /// loaded search results are patched in place for every matching key
    /// and the favorites slot is re-read; returns whether the store
    /// changed. No identity or a failed write returns false with every
    /// slot untouched.
    pub fn toggle_favorite(&self, book: &Book) -> bool {
        let Some(uid) = self.auth.current_uid() else {
            return false;
        };

        debug!("toggling favorite {}", book.key);
        if let Err(e) = self.apply_toggle(&uid, book) {
            warn!("toggle favorite failed for {}: {}", book.key, e);
            return false;
        }

        let now_favorite = !book.is_favorite;
        self.search.send_if_modified(|state| {
            let FetchState::Success(books) = state else {
                return false;
            };
            let mut changed = false;
            for entry in books.iter_mut().filter(|b| b.key == book.key) {
                entry.is_favorite = now_favorite;
                changed = true;
            }
            changed
        });
        self.load_favorites();
        true
    }

    /// Load the notes text for a book into the notes slot.
    ///
    /// No identity, a missing document, and a failed read all resolve to
    /// the empty string.
    pub fn load_book_notes(&self, key: &str) {
        let text = self
            .auth
            .current_uid()
            .map(|uid| or_default("load book notes", self.read_notes(&uid, key)))
            .unwrap_or_default();
        self.notes.send_replace(text);
    }

    /// Save the notes text for a book, last write wins.
    ///
    /// No identity returns false without touching the save slot.
    pub fn save_book_notes(&self, key: &str, text: &str) -> bool {
        let Some(uid) = self.auth.current_uid() else {
            return false;
        };

        self.save_notes.send_replace(ActionState::Loading);
        match self
            .store
            .set(&paths::book_notes(&uid, key), &Value::String(text.to_string()))
        {
            Ok(()) => {
                self.notes.send_replace(text.to_string());
                self.save_notes.send_replace(ActionState::Success);
                true
            }
            Err(e) => {
                self.save_notes.send_replace(ActionState::Error(e.to_string()));
                false
            }
        }
    }

    /// Return the save-notes slot to Initial, ready for the next save
    pub fn reset_save_notes(&self) {
        self.save_notes.send_replace(ActionState::Initial);
    }

    /// Load the search history, newest first
    pub fn load_search_history(&self) {
        self.history.send_replace(FetchState::Loading);
        let Some(uid) = self.auth.current_uid() else {
            self.history.send_replace(FetchState::Empty);
            return;
        };
        let entries = or_default("load search history", self.read_history(&uid));
        self.history.send_replace(FetchState::from_list(entries));
    }

    /// Append a query to the search history and re-read it.
    ///
    /// Blank queries are rejected before any write.
    pub fn save_search_query(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        let Some(uid) = self.auth.current_uid() else {
            return false;
        };

        if let Err(e) = self.append_history(&uid, query) {
            warn!("save search query failed: {}", e);
            return false;
        }
        self.load_search_history();
        true
    }

    /// Delete one history entry by id and re-read the history
    pub fn delete_search_history_item(&self, id: &str) -> bool {
        let Some(uid) = self.auth.current_uid() else {
            return false;
        };

        match self.store.delete(&paths::search_history_entry(&uid, id)) {
            Ok(()) => {
                self.load_search_history();
                true
            }
            Err(e) => {
                warn!("delete search history entry failed: {}", e);
                false
            }
        }
    }

    /// Drop the whole search history and set the slot to Empty
    pub fn clear_search_history(&self) -> bool {
        let Some(uid) = self.auth.current_uid() else {
            return false;
        };

        match self.store.delete(&paths::search_history(&uid)) {
            Ok(()) => {
                self.history.send_replace(FetchState::Empty);
                true
            }
            Err(e) => {
                warn!("clear search history failed: {}", e);
                false
            }
        }
    }

    /// Load the reading state for a book.
    ///
    /// No identity, absence, an unreadable value, and a failed read all
    /// resolve to NotStarted.
    pub fn load_reading_state(&self, key: &str) {
        let state = self
            .auth
            .current_uid()
            .map(|uid| or_default("load reading state", self.read_reading_state(&uid, key)))
            .unwrap_or_default();
        self.reading.send_replace(state);
    }

    /// Record the reading state for a book and reflect it in the slot
    pub fn update_reading_state(&self, key: &str, state: ReadingState) -> bool {
        let Some(uid) = self.auth.current_uid() else {
            return false;
        };

        debug!("setting reading state for {} to {}", key, state);
        let value = Value::String(state.as_str().to_string());
        match self.store.set(&paths::reading_state(&uid, key), &value) {
            Ok(()) => {
                self.reading.send_replace(state);
                true
            }
            Err(e) => {
                warn!("update reading state failed for {}: {}", key, e);
                false
            }
        }
    }

    fn apply_toggle(&self, uid: &str, book: &Book) -> Result<()> {
        let path = paths::favorite(uid, &book.key);
        if book.is_favorite {
            self.store.delete(&path)?;
        } else {
            let entry = FavoriteEntry::new(book, Utc::now().timestamp_millis());
            self.store.set(&path, &serde_json::to_value(&entry)?)?;
        }
        Ok(())
    }

    /// Decode the stored favorites, skipping entries that no longer parse
    fn stored_favorites(&self, uid: &str) -> Vec<Book> {
        let entries = or_default("list favorites", self.store.list(&paths::favorites(uid)));
        entries
            .into_iter()
            .filter_map(|(name, value)| {
                match serde_json::from_value::<FavoriteEntry>(value) {
                    Ok(entry) => {
                        let mut book = entry.book;
                        book.is_favorite = true;
                        Some(book)
                    }
                    Err(e) => {
                        warn!("skipping unreadable favorite {}: {}", name, e);
                        None
                    }
                }
            })
            .collect()
    }

    fn favorite_keys(&self) -> HashSet<String> {
        match self.auth.current_uid() {
            Some(uid) => self
                .stored_favorites(&uid)
                .into_iter()
                .map(|book| book.key)
                .collect(),
            None => HashSet::new(),
        }
    }

    fn read_notes(&self, uid: &str, key: &str) -> StoreResult<String> {
        Ok(self
            .store
            .get(&paths::book_notes(uid, key))?
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default())
    }

    fn read_history(&self, uid: &str) -> StoreResult<Vec<SearchHistoryEntry>> {
        let mut entries: Vec<SearchHistoryEntry> = self
            .store
            .list(&paths::search_history(uid))?
            .into_iter()
            .filter_map(|(name, value)| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping unreadable history entry {}: {}", name, e);
                    None
                }
            })
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    fn read_reading_state(&self, uid: &str, key: &str) -> StoreResult<ReadingState> {
        Ok(self
            .store
            .get(&paths::reading_state(uid, key))?
            .and_then(|value| {
                serde_json::from_value(value)
                    .map_err(|e| warn!("unreadable reading state for {}: {}", key, e))
                    .ok()
            })
            .unwrap_or_default())
    }

    fn append_history(&self, uid: &str, query: &str) -> Result<()> {
        let id = self.store.generate_key();
        let entry = SearchHistoryEntry {
            query: query.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            id: id.clone(),
        };
        self.store.set(
            &paths::search_history_entry(uid, &id),
            &serde_json::to_value(&entry)?,
        )?;
        Ok(())
    }
}
