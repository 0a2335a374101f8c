//! Book catalog search
//!
//! Wraps the external search API behind the [`Catalog`] trait and
//! translates raw catalog records into [`Book`] values. The shipped
//! implementation talks to Open Library's `search.json` endpoint.
//!
//! Failure policy: any transport error, non-success status, or malformed
//! body yields an empty result list (graceful degradation, logged at warn
//! level). Favorite status is never this component's concern; every
//! returned book has `is_favorite == false`.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::config::Config;
use crate::models::Book;

/// Author placeholder when the catalog record names none
const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Description placeholder when the catalog record has no first sentence
const NO_DESCRIPTION: &str = "No description available";

/// Base URL for cover images, keyed by numeric cover id
const COVERS_BASE_URL: &str = "https://covers.openlibrary.org/b/id";

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// A free-text book search source
#[async_trait]
pub trait Catalog {
    /// Search the catalog. Callers are responsible for short-circuiting
    /// blank queries; implementations may assume non-blank input.
    async fn search(&self, query: &str) -> Result<Vec<Book>>;
}

/// Catalog client for the Open Library search API
pub struct OpenLibrary {
    base_url: String,
    limit: u32,
}

impl OpenLibrary {
    /// Create a client from the application configuration
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config.catalog_url.clone(), config.search_limit)
    }

    /// Create a client against a specific base URL (used by tests)
    pub fn with_base_url(base_url: impl Into<String>, limit: u32) -> Self {
        Self {
            base_url: base_url.into(),
            limit,
        }
    }

    /// Inner fetch that can fail; the trait impl absorbs the failure
    async fn try_search(&self, query: &str) -> Result<Vec<Book>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT))
            .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let limit = self.limit.to_string();
        let response = client
            .get(format!("{}/search.json", self.base_url))
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("catalog returned status {}", response.status());
            return Ok(Vec::new());
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.docs.into_iter().map(doc_into_book).collect())
    }
}

#[async_trait]
impl Catalog for OpenLibrary {
    async fn search(&self, query: &str) -> Result<Vec<Book>> {
        match self.try_search(query).await {
            Ok(books) => Ok(books),
            Err(e) => {
                warn!("catalog search failed, returning no results: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

/// Wire shape of the search response (unknown fields ignored)
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

/// One raw catalog record
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchDoc {
    key: String,
    title: String,
    author_name: Option<Vec<String>>,
    cover_i: Option<i64>,
    first_sentence: Option<FirstSentence>,
}

/// `first_sentence` arrives as either a single string or an array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FirstSentence {
    One(String),
    Many(Vec<String>),
}

impl FirstSentence {
    fn into_first(self) -> Option<String> {
        match self {
            FirstSentence::One(s) => Some(s),
            FirstSentence::Many(items) => items.into_iter().next(),
        }
    }
}

/// Translate a raw record into a Book
fn doc_into_book(doc: SearchDoc) -> Book {
    Book {
        id: String::new(),
        key: doc.key,
        title: doc.title,
        author: join_authors(doc.author_name),
        cover_url: cover_url(doc.cover_i),
        description: first_description(doc.first_sentence),
        is_favorite: false,
    }
}

fn join_authors(names: Option<Vec<String>>) -> String {
    match names {
        Some(names) if !names.is_empty() => names.join(", "),
        _ => UNKNOWN_AUTHOR.to_string(),
    }
}

fn cover_url(cover_id: Option<i64>) -> String {
    match cover_id {
        Some(id) => format!("{}/{}-L.jpg", COVERS_BASE_URL, id),
        None => String::new(),
    }
}

fn first_description(first_sentence: Option<FirstSentence>) -> String {
    first_sentence
        .and_then(FirstSentence::into_first)
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_doc_into_book_full_record() {
        let doc: SearchDoc = serde_json::from_value(serde_json::json!({
            "key": "/works/OL893415W",
            "title": "Dune",
            "author_name": ["Frank Herbert", "Someone Else"],
            "cover_i": 11481354,
            "first_sentence": ["A beginning is the time for taking care."]
        }))
        .unwrap();

        let book = doc_into_book(doc);
        assert_eq!(book.key, "/works/OL893415W");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert, Someone Else");
        assert_eq!(
            book.cover_url,
            "https://covers.openlibrary.org/b/id/11481354-L.jpg"
        );
        assert_eq!(book.description, "A beginning is the time for taking care.");
        assert!(!book.is_favorite);
        assert!(book.id.is_empty());
    }

    #[test]
    fn test_doc_into_book_minimal_record_uses_placeholders() {
        let doc: SearchDoc = serde_json::from_value(serde_json::json!({
            "key": "/works/OL1W",
            "title": "Obscure"
        }))
        .unwrap();

        let book = doc_into_book(doc);
        assert_eq!(book.author, "Unknown author");
        assert_eq!(book.cover_url, "");
        assert_eq!(book.description, "No description available");
    }

    #[test]
    fn test_first_sentence_accepts_plain_string() {
        let doc: SearchDoc = serde_json::from_value(serde_json::json!({
            "key": "/works/OL2W",
            "title": "T",
            "first_sentence": "Call me Ishmael."
        }))
        .unwrap();

        assert_eq!(doc_into_book(doc).description, "Call me Ishmael.");
    }

    #[test]
    fn test_empty_author_list_uses_placeholder() {
        assert_eq!(join_authors(Some(vec![])), "Unknown author");
        assert_eq!(join_authors(None), "Unknown author");
    }

    #[tokio::test]
    async fn test_search_translates_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "dune".into()),
                Matcher::UrlEncoded("limit".into(), "20".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "numFound": 2,
                    "start": 0,
                    "docs": [
                        {
                            "key": "/works/OL893415W",
                            "title": "Dune",
                            "author_name": ["Frank Herbert"],
                            "cover_i": 11481354
                        },
                        {
                            "key": "/works/OL893416W",
                            "title": "Dune Messiah"
                        }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let catalog = OpenLibrary::with_base_url(server.url(), 20);
        let books = catalog.search("dune").await.unwrap();

        mock.assert_async().await;
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[0].author, "Frank Herbert");
        assert_eq!(books[1].author, "Unknown author");
    }

    #[tokio::test]
    async fn test_search_non_success_yields_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let catalog = OpenLibrary::with_base_url(server.url(), 20);
        let books = catalog.search("dune").await.unwrap();

        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_search_malformed_body_yields_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json at all")
            .create_async()
            .await;

        let catalog = OpenLibrary::with_base_url(server.url(), 20);
        let books = catalog.search("dune").await.unwrap();

        assert!(books.is_empty());
    }
}
