pub mod config;
pub mod logging;
pub mod search;
pub mod ui;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use config::{Config, Overrides};
use search::client::{HttpQueryClient, QueryClient};
use search::protocol::SearchRequest;
use ui::selection::DisplayedMatches;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "tbrush",
    version,
    about = "Fuzzy-find, preview and edit notes from the terminal"
)]
pub struct Cli {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
pub struct ServerArgs {
    /// Index server host (default localhost)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Index server port (default 38906)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Notes directory (default ~/Dropbox/tbrush_notes)
    #[arg(long, global = true)]
    pub notes_dir: Option<PathBuf>,

    /// Metadata directory for scratch files, logs and config.toml
    #[arg(long, global = true)]
    pub meta_dir: Option<PathBuf>,
}

impl ServerArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            notes_dir: self.notes_dir.clone(),
            meta_dir: self.meta_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive search (default)
    Tui {
        /// Render once and exit (headless-friendly)
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Run one search and print the ranked notes
    Search {
        query: String,

        /// Row whose content is previewed
        #[arg(long, default_value_t = 0)]
        selected: usize,

        /// Print the raw server reply as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a note by name
    Delete { note: String },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui { once: false });

    match command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "tbrush", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
        Commands::Tui { once } => {
            let config = Config::load(&cli.server.overrides())?;
            config.ensure_dirs().with_context(|| {
                format!(
                    "creating {} and {}",
                    config.notes_dir.display(),
                    config.meta_dir.display()
                )
            })?;
            let _guard = logging::init_file(&config.log_path())?;
            ui::tui::run_tui(&config, once)
        }
        Commands::Search {
            query,
            selected,
            json,
        } => {
            logging::init_stderr()?;
            let config = Config::load(&cli.server.overrides())?;
            run_search(&config, query, selected, json).await
        }
        Commands::Delete { note } => {
            logging::init_stderr()?;
            let config = Config::load(&cli.server.overrides())?;
            let client = HttpQueryClient::new(config.server.clone(), config.request_timeout)?;
            client
                .delete(note.clone())
                .await
                .with_context(|| format!("deleting {note}"))?;
            println!("deleted {note}");
            Ok(())
        }
    }
}

async fn run_search(config: &Config, query: String, selected: usize, json: bool) -> Result<()> {
    let client = HttpQueryClient::new(config.server.clone(), config.request_timeout)?;
    let reply = client
        .search(SearchRequest::new(query.clone(), selected))
        .await
        .with_context(|| format!("searching for {query:?}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    let displayed = DisplayedMatches::from_reply(&query, &reply);
    for (row, label) in displayed.labels().iter().enumerate() {
        let marker = if row == selected { '>' } else { ' ' };
        match displayed.matches().get(row) {
            Some(hit) => println!("{marker} {label}  ({:.3})", hit.score),
            None => println!("{marker} {label}"),
        }
    }
    if !reply.selected_content.is_empty() {
        println!();
        println!("{}", reply.selected_content);
    }
    Ok(())
}
