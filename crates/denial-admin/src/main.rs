//! Denial admin CLI.
//!
//! The main entry point for the `denial-admin` binary.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use denial_admin::commands::{category, keyword, list, show};
use denial_admin::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::List(args) => list::execute(args, &config).await,
            Commands::Show(args) => show::execute(args, &config).await,
            Commands::AddCategory(args) => category::add(args, &config).await,
            Commands::RenameCategory(args) => category::rename(args, &config).await,
            Commands::DeleteCategory(args) => category::delete(args, &config).await,
            Commands::AddKeyword(args) => keyword::add(args, &config).await,
            Commands::EditKeyword(args) => keyword::edit(args, &config).await,
            Commands::DeleteKeyword(args) => keyword::delete(args, &config).await,
        }
    })
}
