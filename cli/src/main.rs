//! `todo`: terminal front end for the todo service.
//!
//! Commands run one operation through a `TodoStore` (or straight through the
//! transport for single-item reads) and print the settled state. Failures
//! exit non-zero with the error message.

mod render;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use todo_core::{
    ClientConfig, CreateTodo, RestTransport, StatusFilter, TodoStore, TodoTransport, UpdateTodo,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Manage todos on a todo service")]
struct Cli {
    /// Service base URL [env: TODO_API_URL, default: http://localhost:3000]
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in milliseconds [env: TODO_API_TIMEOUT_MS, default: 10000]
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List todos
    List {
        #[arg(long, default_value_t = StatusFilter::All)]
        filter: StatusFilter,
        /// Case-insensitive text to look for in title or description
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show one todo
    Show { id: u64 },
    /// Create a todo
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        completed: bool,
    },
    /// Change fields of a todo
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        /// Empty string clears the description
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip the completed flag of a todo
    Toggle { id: u64 },
    /// Delete a todo
    Delete { id: u64 },
    /// Print total, completed and pending counts
    Stats {
        /// Ask the service instead of counting locally
        #[arg(long)]
        remote: bool,
    },
}

impl Cli {
    fn config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url)?;
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config()?;
    debug!(base_url = %config.base_url, timeout = ?config.timeout, "using todo service");
    let store = TodoStore::from_config(&config).context("failed to build HTTP client")?;

    match cli.command {
        Command::List { filter, search } => {
            store.load_todos().await?;
            let visible = store.visible(filter, &search);
            print!("{}", render::list(&visible));
        }
        Command::Show { id } => {
            let todo = RestTransport::from_config(&config)?.get_by_id(id).await?;
            print!("{}", render::detail(&todo));
        }
        Command::Add {
            title,
            description,
            completed,
        } => {
            let input = CreateTodo::new(&title, description.as_deref())?.completed(completed);
            let todo = store.add_todo(&input).await?;
            println!("{}", render::line(&todo));
        }
        Command::Update {
            id,
            title,
            description,
            completed,
        } => {
            let mut patch = UpdateTodo {
                completed,
                ..UpdateTodo::default()
            };
            if let Some(title) = title {
                patch = patch.with_title(&title)?;
            }
            if let Some(description) = description {
                patch = patch.with_description(&description)?;
            }
            anyhow::ensure!(!patch.is_empty(), "nothing to update");
            let todo = store.update_todo(id, &patch).await?;
            println!("{}", render::line(&todo));
        }
        Command::Toggle { id } => {
            store.load_todos().await?;
            let todo = store
                .toggle_todo(id)
                .await?
                .with_context(|| format!("Todo with ID {id} not found"))?;
            println!("{}", render::line(&todo));
        }
        Command::Delete { id } => {
            let removed = store.delete_todo(id).await?;
            match removed {
                Some(todo) => println!("deleted {}", render::line(&todo)),
                None => println!("deleted #{id}"),
            }
        }
        Command::Stats { remote } => {
            let stats = if remote {
                RestTransport::from_config(&config)?.statistics().await?
            } else {
                store.load_todos().await?;
                store.statistics()
            };
            println!("{}", render::statistics(&stats));
        }
    }
    Ok(())
}
