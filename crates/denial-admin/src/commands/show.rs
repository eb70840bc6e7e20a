//! Show command - print one keyword.

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use serde_json::json;

use denial_core::{Catalog, Category, Keyword};

use crate::client::{CatalogApi, HttpCatalogClient};
use crate::{Config, OutputFormat};

/// Arguments for the show command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Keyword ID.
    #[arg()]
    pub keyword_id: String,

    /// Category holding the keyword. Defaults to the first category that has it.
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched or the keyword is absent.
pub async fn execute(args: ShowArgs, config: &Config) -> Result<()> {
    let client = HttpCatalogClient::from_config(config)?;
    let catalog = client.fetch().await.context("Failed to load catalog")?;
    let (category, keyword) = find(&catalog, &args)?;

    match config.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "categoryId": category.id,
                    "id": keyword.id,
                    "label": keyword.label,
                    "template": keyword.template,
                }))?
            );
        }
        OutputFormat::Text | OutputFormat::Table => {
            println!("Keyword:  {} ({})", keyword.label.bold(), keyword.id);
            println!("Category: {} ({})", category.label, category.id);
            println!();
            println!("{}", keyword.template);
        }
    }

    Ok(())
}

fn find<'a>(catalog: &'a Catalog, args: &ShowArgs) -> Result<(&'a Category, &'a Keyword)> {
    match &args.category {
        Some(category_id) => {
            let category = catalog
                .category(category_id)
                .with_context(|| format!("Category not found: {category_id}"))?;
            let keyword = category
                .keyword(&args.keyword_id)
                .with_context(|| format!("Keyword not found: {}", args.keyword_id))?;
            Ok((category, keyword))
        }
        None => catalog
            .keyword_by_id(&args.keyword_id)
            .with_context(|| format!("Keyword not found: {}", args.keyword_id)),
    }
}
