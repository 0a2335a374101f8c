//! Search command handler

use anyhow::{bail, Result};

use shelf_core::FetchState;

use crate::output::Output;
use crate::Books;

/// Search the catalog and record the query in the history.
///
/// The history write is best-effort: signed-out sessions skip it.
pub async fn run(books: &Books, query: String, output: &Output) -> Result<()> {
    books.save_search_query(&query);
    books.search(&query).await;

    let state = books.subscribe_search().borrow().clone();
    match state {
        FetchState::Success(results) => output.print_books(&results),
        FetchState::Empty => output.message("No results."),
        FetchState::Initial => output.message("Nothing to search for."),
        FetchState::Error(message) => bail!("Search failed: {}", message),
        FetchState::Loading => unreachable!(), // search completed above
    }

    Ok(())
}
