//! # denial-admin
//!
//! Admin editor for the denial reason catalog.
//!
//! The [`editor`] module holds the single-operator state machine; the binary
//! drives it from the command line for scripted edits.
//!
//! ## Commands
//!
//! - `denial-admin list` - Print every category and keyword
//! - `denial-admin show` - Print one keyword's template
//! - `denial-admin add-category` / `rename-category` / `delete-category`
//! - `denial-admin add-keyword` / `edit-keyword` / `delete-keyword`
//!
//! ## Configuration
//!
//! - `DENIAL_API_URL` - API endpoint (default: `http://localhost:8080`)

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod client;
pub mod commands;
pub mod editor;

use clap::{Parser, Subcommand};

/// Denial catalog admin CLI.
#[derive(Debug, Parser)]
#[command(name = "denial-admin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API server URL.
    #[arg(long, env = "DENIAL_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the effective configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            api_url: self.api_url.clone(),
            format: self.format.clone(),
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List categories and keywords.
    List(commands::list::ListArgs),
    /// Show one keyword.
    Show(commands::show::ShowArgs),
    /// Add a category.
    AddCategory(commands::category::AddCategoryArgs),
    /// Rename a category.
    RenameCategory(commands::category::RenameCategoryArgs),
    /// Delete a category and its keywords.
    DeleteCategory(commands::category::DeleteCategoryArgs),
    /// Add a keyword to a category.
    AddKeyword(commands::keyword::AddKeywordArgs),
    /// Change a keyword's label or template.
    EditKeyword(commands::keyword::EditKeywordArgs),
    /// Delete a keyword.
    DeleteKeyword(commands::keyword::DeleteKeywordArgs),
}

/// Output format.
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// Table output.
    Table,
}

/// CLI configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// API server URL.
    pub api_url: String,
    /// Output format.
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_config_from_flags() {
        let cli = Cli::parse_from([
            "denial-admin",
            "--api-url",
            "https://catalog.example.com",
            "--format",
            "json",
            "list",
        ]);

        let config = cli.config();
        assert_eq!(config.api_url, "https://catalog.example.com");
        assert!(matches!(config.format, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_subcommand_names_are_kebab_case() {
        let cli = Cli::parse_from([
            "denial-admin",
            "add-keyword",
            "image-quality",
            "Too Dark",
            "--template",
            "Photo is too dark.",
        ]);
        assert!(matches!(cli.command, Commands::AddKeyword(_)));

        let cli = Cli::parse_from(["denial-admin", "delete-category", "image-quality"]);
        assert!(matches!(cli.command, Commands::DeleteCategory(_)));
    }
}
