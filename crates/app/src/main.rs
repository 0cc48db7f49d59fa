//! `vocab` command-line interface. Every command prints pretty JSON on stdout.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use services::{AppServices, Clock, ProgressConfig};
use vocab_core::model::{UserId, VocabListId, WordId};

mod db;
mod logging;
mod seed;

#[derive(Debug, Parser)]
#[command(name = "vocab", version, about = "Vocabulary progress tracker")]
struct Cli {
    /// SQLite database URL or path
    #[arg(long, global = true, env = "VOCAB_DB_URL", default_value = db::DEFAULT_DB_URL)]
    db: String,

    /// Tracing filter directives, e.g. "info" or "services=debug"
    #[arg(long, global = true, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the dashboard summary of a learner
    Dashboard {
        #[arg(long)]
        user: UserId,
    },

    /// Record one correct answer
    Answer {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        word: WordId,
    },

    /// Start tracking a list
    Activate {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        list: VocabListId,
    },

    /// Stop tracking a list
    Deactivate {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        list: VocabListId,
    },

    /// Browse system and own lists
    Lists {
        #[arg(long)]
        user: UserId,
        /// Only lists of this level code
        #[arg(long)]
        level: Option<String>,
    },

    /// Show the words of a list with the learner's counts
    Detail {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        list: VocabListId,
    },

    /// Browse all words across lists, 50 per page
    Words {
        /// Only words of lists with this level code
        #[arg(long)]
        level: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Create a custom list, optionally copying words
    CreateList {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        level: String,
        /// Comma-separated word ids to copy
        #[arg(long, value_delimiter = ',')]
        copy: Vec<WordId>,
    },

    /// Delete one of the learner's custom lists
    DeleteList {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        list: VocabListId,
    },

    /// Insert levels, a learner and sample lists
    Seed {
        #[arg(long, default_value = "1")]
        user: UserId,
        #[arg(long, default_value = "learner")]
        username: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ProgressConfig::from_env().context("reading progress configuration")?;
    let db_url = db::normalize_sqlite_url(&cli.db);
    db::prepare_sqlite_file(&db_url)?;
    let app = AppServices::new_sqlite(&db_url, Clock::default(), config)
        .await
        .with_context(|| format!("opening {db_url}"))?;
    tracing::debug!(db = %db_url, command = ?cli.command, "running command");

    match cli.command {
        Commands::Dashboard { user } => print_json(&app.dashboard().summary(user).await?),
        Commands::Answer { user, word } => {
            print_json(&app.answers().record_correct_answer(user, word).await?)
        }
        Commands::Activate { user, list } => {
            let changed = app.membership().activate(user, list).await?;
            print_json(&json!({ "list": list, "active": true, "changed": changed }))
        }
        Commands::Deactivate { user, list } => {
            let changed = app.membership().deactivate(user, list).await?;
            print_json(&json!({ "list": list, "active": false, "changed": changed }))
        }
        Commands::Lists { user, level } => {
            print_json(&app.catalog().browse(user, level.as_deref()).await?)
        }
        Commands::Detail { user, list } => {
            print_json(&app.catalog().list_detail(user, list).await?)
        }
        Commands::Words { level, page } => {
            print_json(&app.catalog().vocabulary(level.as_deref(), page).await?)
        }
        Commands::CreateList {
            user,
            name,
            level,
            copy,
        } => print_json(
            &app.catalog()
                .create_custom_list(user, &name, &level, &copy)
                .await?,
        ),
        Commands::DeleteList { user, list } => {
            app.catalog().delete_custom_list(user, list).await?;
            print_json(&json!({ "deleted": list }))
        }
        Commands::Seed { user, username } => {
            print_json(&seed::seed(&app, user, &username).await?)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
