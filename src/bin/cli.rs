//! Lambda Console CLI
//!
//! Operator entry point for lambda configuration, logs and image batches.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lambda_console::{
    backend,
    config::{self, Overrides},
    error::Result,
    models::{LogLevel, UpdateOutcome, ValueKind},
    services::{BatchService, EditPolicy, LambdaService, parse_assignment},
};

/// Lambda Console - back-office client for configured lambdas
#[derive(Parser, Debug)]
#[command(
    name = "lambda-console",
    version,
    about = "Manage client lambdas and image batches"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "console.toml")]
    config: PathBuf,

    /// Base URL of the API (overrides config and CONSOLE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Serve everything from the in-memory development dataset
    #[arg(long)]
    mock: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured lambdas
    List,

    /// Show a lambda and its configuration
    Show {
        /// Lambda name
        id: String,
    },

    /// Edit a lambda's configuration
    Set {
        /// Lambda name
        id: String,

        /// Assignments of the form KEY=VALUE
        #[arg(required = true)]
        assignments: Vec<String>,

        /// Allow keys the lambda does not have yet
        #[arg(long)]
        add: bool,

        /// Check values as this kind (string, number, boolean) instead of
        /// the kind inferred from the current values
        #[arg(long)]
        kind: Option<String>,
    },

    /// Show a lambda's execution logs
    Logs {
        /// Lambda name
        id: String,

        /// Minimum level (debug, info, warn, error)
        #[arg(long, default_value = "debug")]
        level: String,
    },

    /// List image batches
    Batches,

    /// Show preview image URLs of a batch
    Preview {
        batch_id: String,
    },

    /// Download a batch archive
    Download {
        batch_id: String,

        /// Destination directory (default: storage.download_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        api_url: cli.api_url.clone(),
        mock: cli.mock,
    };
    let config = config::load(&cli.config, &overrides)?;
    log::debug!("Loaded configuration: {:?}", config);

    if let Command::Validate = cli.command {
        log::info!("✓ Config OK");
        println!(
            "backend: {}",
            match (&config.api.base_url, config.use_mock()) {
                (Some(url), false) => url.as_str(),
                _ => "in-memory mock",
            }
        );
        println!("client:  {}", config.api.client_id);
        println!("bucket:  {}", config.storage.bucket);
        return Ok(());
    }

    let backend = backend::from_config(&config)?;
    let lambdas = LambdaService::new(backend.as_ref());
    let batches = BatchService::new(backend.as_ref(), &config.storage.bucket);

    match cli.command {
        Command::List => {
            let list = lambdas.list().await?;
            if list.is_empty() {
                println!("No lambdas configured.");
            }
            for lambda in list {
                let state = if lambda.active { "active" } else { "inactive" };
                println!(
                    "{:<24} {:<28} [{}] {}",
                    lambda.lambda_name,
                    lambda.title(),
                    state,
                    lambda.description
                );
            }
        }

        Command::Show { id } => {
            let lambda = lambdas.details(&id).await?;
            println!("{} ({})", lambda.title(), lambda.lambda_name);
            if !lambda.description.is_empty() {
                println!("{}", lambda.description);
            }
            println!("active: {}", lambda.active);
            for (key, value) in lambda.config.iter() {
                println!("    {key} = {value} ({})", ValueKind::infer(value));
            }
        }

        Command::Set {
            id,
            assignments,
            add,
            kind,
        } => {
            let changes = assignments
                .iter()
                .map(|a| parse_assignment(a))
                .collect::<Result<Vec<_>>>()?;
            let policy = if add {
                EditPolicy::AllowNewKeys
            } else {
                EditPolicy::ExistingKeysOnly
            };
            let kind = kind.as_deref().map(str::parse::<ValueKind>).transpose()?;
            match lambdas.edit(&id, &changes, policy, kind).await? {
                UpdateOutcome::Updated(lambda) => {
                    println!("Saved {} keys for {}", lambda.config.len(), lambda.lambda_name)
                }
                UpdateOutcome::Ack(ack) => println!(
                    "Saved: {}",
                    ack.message.as_deref().unwrap_or("configuration updated")
                ),
            }
        }

        Command::Logs { id, level } => {
            let min_level: LogLevel = level.parse()?;
            let entries = lambdas.logs(&id, min_level).await?;
            if entries.is_empty() {
                println!("No log entries.");
            }
            for entry in entries {
                println!("{}", entry.display_line());
            }
        }

        Command::Batches => {
            let list = batches.list().await?;
            if list.is_empty() {
                println!("No image batches available.");
            }
            for batch in list {
                println!(
                    "{:<20} {:<32} {:>5} images  {}",
                    batch.batch_id,
                    batch.prefix,
                    batch.count,
                    batch.last_modified.as_deref().unwrap_or("-")
                );
            }
        }

        Command::Preview { batch_id } => {
            let urls = batches.preview(&batch_id).await?;
            if urls.is_empty() {
                println!("No preview available for {batch_id}.");
            }
            for url in urls {
                println!("{url}");
            }
        }

        Command::Download { batch_id, out } => {
            let dest = out.unwrap_or_else(|| config.storage.download_dir.clone());
            let archive = batches.download(&batch_id, &dest).await?;
            println!(
                "Downloaded {} ({} bytes) to {}",
                archive.batch_id,
                archive.bytes,
                archive.path.display()
            );
        }

        Command::Validate => {}
    }

    Ok(())
}
