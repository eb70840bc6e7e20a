//! CLI command implementations.
//!
//! Every command loads a fresh editor from the server, drives one transition,
//! and prints the confirmed catalog.

pub mod category;
pub mod keyword;
pub mod list;
pub mod show;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use denial_core::Catalog;

use crate::client::CatalogApi;
use crate::editor::AdminEditor;
use crate::{Config, OutputFormat};

/// Loads an editor from `api`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub async fn load_editor(api: &dyn CatalogApi) -> Result<AdminEditor> {
    let mut editor = AdminEditor::new();
    editor
        .load(api)
        .await
        .context("Failed to load catalog")?;
    Ok(editor)
}

/// Prints the outcome of a successful save.
pub(crate) fn print_saved(summary: &str, catalog: &Catalog, config: &Config) -> Result<()> {
    match config.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(catalog).context("Failed to serialize catalog")?
            );
        }
        OutputFormat::Text | OutputFormat::Table => {
            println!("{} {summary}", "Saved:".green());
            println!(
                "  {} categories, {} keywords",
                catalog.categories.len(),
                catalog.keyword_count()
            );
        }
    }
    Ok(())
}
