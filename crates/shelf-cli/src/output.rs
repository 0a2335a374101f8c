//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::DateTime;

use shelf_core::{Book, ReadingState, SearchHistoryEntry, UserProfile};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a numbered list of books with favorite markers
    pub fn print_books(&self, books: &[Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for (index, book) in books.iter().enumerate() {
                    let marker = if book.is_favorite { "★" } else { " " };
                    println!(
                        "{:>2}. {} {} | {} | {}",
                        index + 1,
                        marker,
                        truncate(&book.title, 40),
                        truncate(&book.author, 30),
                        book.key
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(books).unwrap());
            }
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.key);
                }
            }
        }
    }

    /// Print the search history, newest first
    pub fn print_history(&self, entries: &[SearchHistoryEntry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No search history.");
                    return;
                }
                for entry in entries {
                    println!(
                        "{} | {} | {}",
                        format_timestamp(entry.timestamp),
                        truncate(&entry.query, 40),
                        entry.id
                    );
                }
                println!("\n{} search(es)", entries.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(entries).unwrap());
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id);
                }
            }
        }
    }

    /// Print the notes text for a book
    pub fn print_notes(&self, key: &str, text: &str) {
        match self.format {
            OutputFormat::Human => {
                if text.is_empty() {
                    println!("No notes for this book.");
                } else {
                    println!("{}", text);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"key": key, "notes": text}));
            }
            OutputFormat::Quiet => {
                if !text.is_empty() {
                    println!("{}", text);
                }
            }
        }
    }

    /// Print the reading state for a book
    pub fn print_reading(&self, key: &str, state: ReadingState) {
        match self.format {
            OutputFormat::Human => {
                println!("Reading state: {}", state);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"key": key, "state": state.as_str()})
                );
            }
            OutputFormat::Quiet => {
                println!("{}", state.as_str());
            }
        }
    }

    /// Print the profile document
    pub fn print_profile(&self, profile: &UserProfile) {
        match self.format {
            OutputFormat::Human => {
                println!("Name:    {} {}", profile.first_name, profile.last_name);
                if !profile.second_last_name.is_empty() {
                    println!("Second last name: {}", profile.second_last_name);
                }
                if let Some(birth_date) = profile.birth_date {
                    println!("Born:    {}", birth_date);
                }
                if !profile.profile_picture_url.is_empty() {
                    println!("Picture: {}", profile.profile_picture_url);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(profile).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", profile.uid);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|when| when.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}
