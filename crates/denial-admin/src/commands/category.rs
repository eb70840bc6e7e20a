//! Category commands - add, rename, and delete categories.

use anyhow::Result;
use clap::Args;

use denial_core::derive_id;

use super::{load_editor, print_saved};
use crate::Config;
use crate::client::{CatalogApi, HttpCatalogClient};
use crate::editor::AdminEditor;

/// Arguments for the add-category command.
#[derive(Debug, Args)]
pub struct AddCategoryArgs {
    /// Display label; the id is derived from it.
    #[arg()]
    pub label: String,
}

/// Arguments for the rename-category command.
#[derive(Debug, Args)]
pub struct RenameCategoryArgs {
    /// Category ID.
    #[arg()]
    pub category_id: String,

    /// New display label. The id does not change.
    #[arg()]
    pub label: String,
}

/// Arguments for the delete-category command.
#[derive(Debug, Args)]
pub struct DeleteCategoryArgs {
    /// Category ID.
    #[arg()]
    pub category_id: String,
}

/// Execute the add-category command.
///
/// # Errors
///
/// Returns an error if the label is rejected or the save fails.
pub async fn add(args: AddCategoryArgs, config: &Config) -> Result<()> {
    let client = HttpCatalogClient::from_config(config)?;
    let mut editor = load_editor(&client).await?;
    let summary = add_with(&mut editor, &client, &args).await?;
    print_saved(&summary, editor.catalog(), config)
}

/// Execute the rename-category command.
///
/// # Errors
///
/// Returns an error if the category is unknown, the label is rejected, or the
/// save fails.
pub async fn rename(args: RenameCategoryArgs, config: &Config) -> Result<()> {
    let client = HttpCatalogClient::from_config(config)?;
    let mut editor = load_editor(&client).await?;
    let summary = rename_with(&mut editor, &client, &args).await?;
    print_saved(&summary, editor.catalog(), config)
}

/// Execute the delete-category command.
///
/// # Errors
///
/// Returns an error if the save fails.
pub async fn delete(args: DeleteCategoryArgs, config: &Config) -> Result<()> {
    let client = HttpCatalogClient::from_config(config)?;
    let mut editor = load_editor(&client).await?;
    let summary = delete_with(&mut editor, &client, &args).await?;
    print_saved(&summary, editor.catalog(), config)
}

/// Adds a category through `editor`, returning a one-line summary.
///
/// # Errors
///
/// Returns the editor's rejection or save failure.
pub async fn add_with(
    editor: &mut AdminEditor,
    api: &dyn CatalogApi,
    args: &AddCategoryArgs,
) -> Result<String> {
    editor.begin_add_category()?;
    editor.set_label(args.label.as_str())?;
    editor.submit(api).await?;
    Ok(format!(
        "added category {} ({})",
        args.label.trim(),
        derive_id(&args.label)
    ))
}

/// Renames a category through `editor`, returning a one-line summary.
///
/// # Errors
///
/// Returns the editor's rejection or save failure.
pub async fn rename_with(
    editor: &mut AdminEditor,
    api: &dyn CatalogApi,
    args: &RenameCategoryArgs,
) -> Result<String> {
    editor.begin_edit_category(&args.category_id)?;
    editor.set_label(args.label.as_str())?;
    editor.submit(api).await?;
    Ok(format!(
        "renamed category {} to {}",
        args.category_id,
        args.label.trim()
    ))
}

/// Deletes a category through `editor`, returning a one-line summary.
///
/// # Errors
///
/// Returns the editor's rejection or save failure.
pub async fn delete_with(
    editor: &mut AdminEditor,
    api: &dyn CatalogApi,
    args: &DeleteCategoryArgs,
) -> Result<String> {
    if !editor.catalog().has_category(&args.category_id) {
        tracing::warn!(category_id = %args.category_id, "category not present; saving unchanged catalog");
    }
    editor.delete_category(api, &args.category_id).await?;
    Ok(format!("deleted category {}", args.category_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_args_parsing() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            args: RenameCategoryArgs,
        }

        let cli = TestCli::parse_from(["test", "image-quality", "Photo Quality"]);
        assert_eq!(cli.args.category_id, "image-quality");
        assert_eq!(cli.args.label, "Photo Quality");
    }
}
