//! Shelf CLI
//!
//! Command-line interface for Shelf - book search, favorites, and
//! reading-state sync.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shelf_core::{
    AuthContext, AuthService, BooksService, Config, FileBlobStore, OpenLibrary, ProfileService,
    Session, SqliteStore,
};

mod commands;
mod output;

use output::{Output, OutputFormat};

pub(crate) type Auth = AuthService<SqliteStore>;
pub(crate) type Books = BooksService<OpenLibrary, SqliteStore>;
pub(crate) type Profile = ProfileService<SqliteStore, FileBlobStore>;

/// The wired-up services behind every command
pub(crate) struct App {
    pub config: Config,
    pub context: AuthContext,
    pub session: Option<Session>,
    pub auth: Auth,
    pub books: Books,
    pub profile: Profile,
}

impl App {
    /// Load config, open the store, and restore any persisted session
    fn open() -> Result<App> {
        let config = Config::load()?;
        let store = Arc::new(SqliteStore::open(&config)?);
        let context = AuthContext::new();

        let auth = AuthService::new(Arc::clone(&store), context.clone(), config.session_path());
        let session = auth.restore_session();

        let books = BooksService::new(
            OpenLibrary::new(&config),
            Arc::clone(&store),
            context.clone(),
        );
        let profile = ProfileService::new(
            store,
            FileBlobStore::new(config.blobs_dir()),
            context.clone(),
        );

        Ok(App {
            config,
            context,
            session,
            auth,
            books,
            profile,
        })
    }

    /// Fail with a hint when a command needs a signed-in user
    fn require_identity(&self) -> Result<()> {
        if self.context.is_signed_in() {
            Ok(())
        } else {
            bail!("Not signed in. Run `shelf login` first.");
        }
    }
}

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - book search, favorites, and reading-state sync")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Signup {
        /// Account email
        email: String,
        /// Account password (at least 6 characters)
        password: String,
    },
    /// Sign in to an existing account
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Sign out and forget the local session
    Logout,
    /// Search the catalog
    Search {
        /// Free-text query
        query: String,
    },
    /// Manage the favorites list
    #[command(alias = "fav")]
    Favorites {
        #[command(subcommand)]
        command: Option<FavoritesCommands>,
    },
    /// Manage the search history
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },
    /// Show or set notes on a book
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },
    /// Show or set the reading state of a book
    Reading {
        #[command(subcommand)]
        command: ReadingCommands,
    },
    /// Show or update the profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show identity and store status
    Status,
}

#[derive(Subcommand)]
enum FavoritesCommands {
    /// List favorite books
    #[command(alias = "ls")]
    List,
    /// Re-run a search and toggle one result in or out of favorites
    Toggle {
        /// The query to re-run
        query: String,
        /// 1-based index into the search results
        index: usize,
    },
    /// Remove a favorite by its catalog key
    #[command(alias = "rm")]
    Remove {
        /// Catalog key, e.g. /works/OL893415W
        key: String,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List past searches, newest first
    #[command(alias = "ls")]
    List,
    /// Delete one history entry
    #[command(alias = "rm")]
    Delete {
        /// Entry id as printed by `shelf history`
        id: String,
    },
    /// Drop the whole search history
    Clear,
}

#[derive(Subcommand)]
enum NotesCommands {
    /// Show the notes for a book
    Show {
        /// Catalog key
        key: String,
    },
    /// Replace the notes for a book
    Set {
        /// Catalog key
        key: String,
        /// Notes text
        text: String,
    },
}

#[derive(Subcommand)]
enum ReadingCommands {
    /// Show the reading state for a book
    Show {
        /// Catalog key
        key: String,
    },
    /// Set the reading state for a book
    Set {
        /// Catalog key
        key: String,
        /// One of: not-started, reading, finished
        state: String,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show,
    /// Update the profile
    Update {
        /// First name (required, non-blank)
        #[arg(long)]
        first_name: String,
        /// Last name (required, non-blank)
        #[arg(long)]
        last_name: String,
        /// Second last name
        #[arg(long, default_value = "")]
        second_last_name: String,
        /// Birth date as YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,
        /// Path to a profile picture to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, catalog_url, search_limit)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config doesn't need the store or services
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let app = App::open()?;

    match cli.command {
        Commands::Signup { email, password } => {
            commands::account::signup(&app.auth, email, password, &output)
        }
        Commands::Login { email, password } => {
            commands::account::login(&app.auth, email, password, &output)
        }
        Commands::Logout => commands::account::logout(&app.auth, &output),
        Commands::Search { query } => commands::search::run(&app.books, query, &output).await,
        Commands::Favorites { command } => handle_favorites_command(command, &app, &output).await,
        Commands::History { command } => handle_history_command(command, &app, &output),
        Commands::Notes { command } => handle_notes_command(command, &app, &output),
        Commands::Reading { command } => handle_reading_command(command, &app, &output),
        Commands::Profile { command } => handle_profile_command(command, &app, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Status => commands::status::show(&app, &output),
    }
}

async fn handle_favorites_command(
    command: Option<FavoritesCommands>,
    app: &App,
    output: &Output,
) -> Result<()> {
    match command {
        Some(FavoritesCommands::List) | None => commands::favorites::list(&app.books, output),
        Some(FavoritesCommands::Toggle { query, index }) => {
            app.require_identity()?;
            commands::favorites::toggle(&app.books, query, index, output).await
        }
        Some(FavoritesCommands::Remove { key }) => {
            app.require_identity()?;
            commands::favorites::remove(&app.books, key, output)
        }
    }
}

fn handle_history_command(
    command: Option<HistoryCommands>,
    app: &App,
    output: &Output,
) -> Result<()> {
    match command {
        Some(HistoryCommands::List) | None => commands::history::list(&app.books, output),
        Some(HistoryCommands::Delete { id }) => {
            app.require_identity()?;
            commands::history::delete(&app.books, id, output)
        }
        Some(HistoryCommands::Clear) => {
            app.require_identity()?;
            commands::history::clear(&app.books, output)
        }
    }
}

fn handle_notes_command(command: NotesCommands, app: &App, output: &Output) -> Result<()> {
    match command {
        NotesCommands::Show { key } => commands::book::notes_show(&app.books, key, output),
        NotesCommands::Set { key, text } => {
            app.require_identity()?;
            commands::book::notes_set(&app.books, key, text, output)
        }
    }
}

fn handle_reading_command(command: ReadingCommands, app: &App, output: &Output) -> Result<()> {
    match command {
        ReadingCommands::Show { key } => commands::book::reading_show(&app.books, key, output),
        ReadingCommands::Set { key, state } => {
            app.require_identity()?;
            commands::book::reading_set(&app.books, key, state, output)
        }
    }
}

fn handle_profile_command(
    command: Option<ProfileCommands>,
    app: &App,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ProfileCommands::Show) | None => commands::profile::show(&app.profile, output),
        Some(ProfileCommands::Update {
            first_name,
            last_name,
            second_last_name,
            birth_date,
            image,
        }) => {
            app.require_identity()?;
            commands::profile::update(
                &app.profile,
                first_name,
                last_name,
                second_last_name,
                birth_date,
                image,
                output,
            )
        }
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

/// Route warn-and-above to stderr; RUST_LOG overrides the default
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
