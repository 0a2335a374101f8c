//! Favorites command handlers

use anyhow::{anyhow, bail, Result};

use shelf_core::{Book, FetchState};

use crate::output::Output;
use crate::Books;

/// List the favorites set
pub fn list(books: &Books, output: &Output) -> Result<()> {
    books.load_favorites();

    let state = books.subscribe_favorites().borrow().clone();
    match state {
        FetchState::Success(favorites) => output.print_books(&favorites),
        FetchState::Empty => output.message("No favorites yet."),
        FetchState::Error(message) => bail!("Could not load favorites: {}", message),
        FetchState::Initial | FetchState::Loading => unreachable!(),
    }

    Ok(())
}

/// Re-run a search and toggle the result at a 1-based index
pub async fn toggle(books: &Books, query: String, index: usize, output: &Output) -> Result<()> {
    books.search(&query).await;

    let state = books.subscribe_search().borrow().clone();
    let results = match state {
        FetchState::Success(results) => results,
        FetchState::Empty => bail!("No results for {:?}", query),
        FetchState::Error(message) => bail!("Search failed: {}", message),
        FetchState::Initial => bail!("Nothing to search for"),
        FetchState::Loading => unreachable!(),
    };

    let book = index
        .checked_sub(1)
        .and_then(|i| results.get(i))
        .ok_or_else(|| anyhow!("No result at index {} (found {})", index, results.len()))?;

    if !books.toggle_favorite(book) {
        bail!("Could not update favorites");
    }

    if book.is_favorite {
        output.success(&format!("Removed {:?} from favorites", book.title));
    } else {
        output.success(&format!("Added {:?} to favorites", book.title));
    }
    Ok(())
}

/// Remove a favorite by its catalog key
pub fn remove(books: &Books, key: String, output: &Output) -> Result<()> {
    let mut book = Book::new(key, "");
    book.is_favorite = true;

    if !books.toggle_favorite(&book) {
        bail!("Could not update favorites");
    }

    output.success(&format!("Removed {} from favorites", book.key));
    Ok(())
}
