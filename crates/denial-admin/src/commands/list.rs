//! List command - print the whole catalog.

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;

use denial_core::Catalog;

use crate::client::{CatalogApi, HttpCatalogClient};
use crate::{Config, OutputFormat};

/// Arguments for the list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only list this category.
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Include keyword templates in text output.
    #[arg(long, short = 't')]
    pub templates: bool,
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched or the category filter
/// matches nothing.
pub async fn execute(args: ListArgs, config: &Config) -> Result<()> {
    let client = HttpCatalogClient::from_config(config)?;
    let catalog = client.fetch().await.context("Failed to load catalog")?;
    let catalog = filter(catalog, args.category.as_deref())?;

    match config.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        OutputFormat::Text => print_text(&catalog, args.templates),
        OutputFormat::Table => print_table(&catalog),
    }

    Ok(())
}

fn filter(catalog: Catalog, category: Option<&str>) -> Result<Catalog> {
    let Some(category_id) = category else {
        return Ok(catalog);
    };
    let category = catalog
        .category(category_id)
        .cloned()
        .with_context(|| format!("Category not found: {category_id}"))?;
    Ok(Catalog {
        categories: vec![category],
    })
}

fn print_text(catalog: &Catalog, templates: bool) {
    if catalog.is_empty() {
        println!("No categories");
        return;
    }

    for category in &catalog.categories {
        println!("{} ({})", category.label.bold(), category.id.dimmed());
        if category.keywords.is_empty() {
            println!("  {}", "no keywords".dimmed());
        }
        for keyword in &category.keywords {
            println!("  {} ({})", keyword.label, keyword.id.dimmed());
            if templates {
                println!("    {}", keyword.template);
            }
        }
    }
}

fn print_table(catalog: &Catalog) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct KeywordRow {
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Keyword")]
        keyword: String,
        #[tabled(rename = "Label")]
        label: String,
        #[tabled(rename = "Template")]
        template: String,
    }

    let rows: Vec<_> = catalog
        .categories
        .iter()
        .flat_map(|c| {
            c.keywords.iter().map(|k| KeywordRow {
                category: c.id.clone(),
                keyword: k.id.clone(),
                label: k.label.clone(),
                template: k.template.clone(),
            })
        })
        .collect();

    if rows.is_empty() {
        println!("No keywords");
    } else {
        println!("{}", Table::new(rows));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use denial_core::Category;

    #[test]
    fn test_list_args_parsing() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            args: ListArgs,
        }

        let cli = TestCli::parse_from(["test", "--category", "image-quality", "-t"]);
        assert_eq!(cli.args.category.as_deref(), Some("image-quality"));
        assert!(cli.args.templates);
    }

    #[test]
    fn test_filter_by_category() {
        let catalog = Catalog {
            categories: vec![
                Category::new("image-quality", "Image Quality"),
                Category::new("documents", "Documents"),
            ],
        };

        let filtered = filter(catalog.clone(), Some("documents")).unwrap();
        assert_eq!(filtered.categories.len(), 1);
        assert_eq!(filtered.categories[0].id, "documents");

        assert!(filter(catalog.clone(), Some("missing")).is_err());
        assert_eq!(filter(catalog.clone(), None).unwrap(), catalog);
    }
}
