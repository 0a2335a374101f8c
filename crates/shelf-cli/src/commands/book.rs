//! Notes and reading-state command handlers

use anyhow::{bail, Result};

use shelf_core::ReadingState;

use crate::output::Output;
use crate::Books;

/// Show the notes for a book
pub fn notes_show(books: &Books, key: String, output: &Output) -> Result<()> {
    books.load_book_notes(&key);
    let text = books.subscribe_notes().borrow().clone();
    output.print_notes(&key, &text);
    Ok(())
}

/// Save the notes for a book, replacing any previous text
pub fn notes_set(books: &Books, key: String, text: String, output: &Output) -> Result<()> {
    let save = books.subscribe_save_notes();
    if !books.save_book_notes(&key, &text) {
        let message = save
            .borrow()
            .error_message()
            .unwrap_or("could not save notes")
            .to_string();
        bail!("{}", message);
    }

    output.success("Notes saved");
    Ok(())
}

/// Show the reading state for a book
pub fn reading_show(books: &Books, key: String, output: &Output) -> Result<()> {
    books.load_reading_state(&key);
    let state = *books.subscribe_reading().borrow();
    output.print_reading(&key, state);
    Ok(())
}

/// Set the reading state for a book
pub fn reading_set(books: &Books, key: String, state: String, output: &Output) -> Result<()> {
    let state = parse_state(&state)?;
    if !books.update_reading_state(&key, state) {
        bail!("Could not update reading state");
    }

    output.success(&format!("Marked as {}", state));
    Ok(())
}

fn parse_state(input: &str) -> Result<ReadingState> {
    match input.to_lowercase().replace('-', "_").as_str() {
        "not_started" | "notstarted" => Ok(ReadingState::NotStarted),
        "reading" => Ok(ReadingState::Reading),
        "finished" => Ok(ReadingState::Finished),
        _ => bail!(
            "Unknown reading state: {} (expected not-started, reading, or finished)",
            input
        ),
    }
}
