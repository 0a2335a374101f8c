//! Status command handler

use anyhow::Result;

use shelf_core::FetchState;

use crate::output::{Output, OutputFormat};
use crate::App;

/// Show identity, store location, and collection counts
pub fn show(app: &App, output: &Output) -> Result<()> {
    let (favorites, history) = if app.context.is_signed_in() {
        app.books.load_favorites();
        app.books.load_search_history();
        (
            slot_len(&app.books.subscribe_favorites().borrow()),
            slot_len(&app.books.subscribe_history().borrow()),
        )
    } else {
        (0, 0)
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "signed_in": app.context.is_signed_in(),
                    "email": app.session.as_ref().map(|s| s.email.clone()),
                    "uid": app.context.current_uid(),
                    "database": app.config.db_path(),
                    "counts": {
                        "favorites": favorites,
                        "history": history
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            if let Some(uid) = app.context.current_uid() {
                println!("{}", uid);
            }
        }
        OutputFormat::Human => {
            println!("Shelf Status");
            println!("============");
            println!();
            match &app.session {
                Some(session) => println!("Signed in:  {}", session.email),
                None => println!("Signed in:  (no)"),
            }
            println!("Database:   {}", app.config.db_path().display());
            println!();
            println!("Contents:");
            println!("  Favorites: {}", favorites);
            println!("  History:   {}", history);
        }
    }

    Ok(())
}

fn slot_len<T>(state: &FetchState<Vec<T>>) -> usize {
    state.success().map(Vec::len).unwrap_or(0)
}
