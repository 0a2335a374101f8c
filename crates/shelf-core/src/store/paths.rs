//! Store path layout
//!
//! All per-user documents live under `users/{uid}/...`; account records for
//! the local auth service live under `accounts/{email}`. Catalog keys may
//! contain `/` (e.g. `/works/OL893415W`), which would read as extra path
//! segments, so segments derived from catalog keys are sanitized first.
//!
//! One deliberate exception: book notes are stored under the raw catalog
//! key. The layout predates sanitization and is kept byte-compatible; in a
//! slash-delimited tree the raw key simply nests deeper, and notes are only
//! ever addressed by exact path.

/// Replace path-separator characters in a catalog key so it can be used as
/// a single store path segment.
pub fn sanitize_key(key: &str) -> String {
    key.replace('/', "_")
}

/// Path to a user's favorites collection.
pub fn favorites(uid: &str) -> String {
    format!("users/{}/favorites", uid)
}

/// Path to one favorite entry, keyed by sanitized catalog key.
pub fn favorite(uid: &str, book_key: &str) -> String {
    format!("users/{}/favorites/{}", uid, sanitize_key(book_key))
}

/// Path to the notes document for a book (raw key, see module docs).
pub fn book_notes(uid: &str, book_key: &str) -> String {
    format!("users/{}/book_notes/{}", uid, book_key)
}

/// Path to a user's search-history collection.
pub fn search_history(uid: &str) -> String {
    format!("users/{}/search_history", uid)
}

/// Path to one search-history entry.
pub fn search_history_entry(uid: &str, entry_id: &str) -> String {
    format!("users/{}/search_history/{}", uid, entry_id)
}

/// Path to the reading state for a book, keyed by sanitized catalog key.
pub fn reading_state(uid: &str, book_key: &str) -> String {
    format!("users/{}/reading_states/{}", uid, sanitize_key(book_key))
}

/// Path to a user's profile document.
pub fn profile(uid: &str) -> String {
    format!("users/{}/profile", uid)
}

/// Path to a local account record.
pub fn account(email: &str) -> String {
    format!("accounts/{}", sanitize_key(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("/works/OL893415W"), "_works_OL893415W");
        assert_eq!(sanitize_key("plain"), "plain");
        assert_eq!(sanitize_key(""), "");
    }

    #[test]
    fn test_favorite_path_is_sanitized() {
        assert_eq!(
            favorite("u1", "/works/OL893415W"),
            "users/u1/favorites/_works_OL893415W"
        );
    }

    #[test]
    fn test_book_notes_path_keeps_raw_key() {
        assert_eq!(
            book_notes("u1", "/works/OL893415W"),
            "users/u1/book_notes//works/OL893415W"
        );
    }

    #[test]
    fn test_reading_state_path_is_sanitized() {
        assert_eq!(
            reading_state("u1", "/works/OL1W"),
            "users/u1/reading_states/_works_OL1W"
        );
    }

    #[test]
    fn test_collection_paths() {
        assert_eq!(favorites("u1"), "users/u1/favorites");
        assert_eq!(search_history("u1"), "users/u1/search_history");
        assert_eq!(search_history_entry("u1", "abc"), "users/u1/search_history/abc");
        assert_eq!(profile("u1"), "users/u1/profile");
        assert_eq!(account("reader@example.com"), "accounts/reader@example.com");
    }
}
