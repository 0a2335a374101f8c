//! Search history command handlers

use anyhow::{bail, Result};

use shelf_core::FetchState;

use crate::output::Output;
use crate::Books;

/// List the search history, newest first
pub fn list(books: &Books, output: &Output) -> Result<()> {
    books.load_search_history();

    let state = books.subscribe_history().borrow().clone();
    match state {
        FetchState::Success(entries) => output.print_history(&entries),
        FetchState::Empty => output.message("No search history."),
        FetchState::Error(message) => bail!("Could not load history: {}", message),
        FetchState::Initial | FetchState::Loading => unreachable!(),
    }

    Ok(())
}

/// Delete one history entry by id
pub fn delete(books: &Books, id: String, output: &Output) -> Result<()> {
    if !books.delete_search_history_item(&id) {
        bail!("Could not delete history entry {}", id);
    }

    output.success(&format!("Deleted history entry {}", id));
    Ok(())
}

/// Drop the whole search history
pub fn clear(books: &Books, output: &Output) -> Result<()> {
    if output.should_prompt() && !confirm("Clear the whole search history?")? {
        println!("Cancelled.");
        return Ok(());
    }

    if !books.clear_search_history() {
        bail!("Could not clear search history");
    }

    output.success("Search history cleared");
    Ok(())
}

/// Ask for a yes/no confirmation on stdin
fn confirm(prompt: &str) -> Result<bool> {
    use std::io::{self, Write};

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim(), "y" | "Y" | "yes"))
}
