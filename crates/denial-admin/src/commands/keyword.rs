//! Keyword commands - add, edit, and delete keywords.

use anyhow::{Result, bail};
use clap::Args;

use denial_core::derive_id;

use super::{load_editor, print_saved};
use crate::Config;
use crate::client::{CatalogApi, HttpCatalogClient};
use crate::editor::AdminEditor;

/// Arguments for the add-keyword command.
#[derive(Debug, Args)]
pub struct AddKeywordArgs {
    /// Category ID.
    #[arg()]
    pub category_id: String,

    /// Display label; the id is derived from it.
    #[arg()]
    pub label: String,

    /// Denial reason text.
    #[arg(long, short = 't')]
    pub template: String,
}

/// Arguments for the edit-keyword command.
///
/// Omitted fields keep their current value.
#[derive(Debug, Args)]
pub struct EditKeywordArgs {
    /// Category ID.
    #[arg()]
    pub category_id: String,

    /// Keyword ID.
    #[arg()]
    pub keyword_id: String,

    /// New display label. The id does not change.
    #[arg(long, short = 'l')]
    pub label: Option<String>,

    /// New denial reason text.
    #[arg(long, short = 't')]
    pub template: Option<String>,
}

/// Arguments for the delete-keyword command.
#[derive(Debug, Args)]
pub struct DeleteKeywordArgs {
    /// Category ID.
    #[arg()]
    pub category_id: String,

    /// Keyword ID.
    #[arg()]
    pub keyword_id: String,
}

/// Execute the add-keyword command.
///
/// # Errors
///
/// Returns an error if the category is unknown, the keyword is rejected, or
/// the save fails.
pub async fn add(args: AddKeywordArgs, config: &Config) -> Result<()> {
    let client = HttpCatalogClient::from_config(config)?;
    let mut editor = load_editor(&client).await?;
    let summary = add_with(&mut editor, &client, &args).await?;
    print_saved(&summary, editor.catalog(), config)
}

/// Execute the edit-keyword command.
///
/// # Errors
///
/// Returns an error if nothing would change, the keyword is unknown or
/// rejected, or the save fails.
pub async fn edit(args: EditKeywordArgs, config: &Config) -> Result<()> {
    if args.label.is_none() && args.template.is_none() {
        bail!("Nothing to change. Pass --label and/or --template");
    }
    let client = HttpCatalogClient::from_config(config)?;
    let mut editor = load_editor(&client).await?;
    let summary = edit_with(&mut editor, &client, &args).await?;
    print_saved(&summary, editor.catalog(), config)
}

/// Execute the delete-keyword command.
///
/// # Errors
///
/// Returns an error if the save fails.
pub async fn delete(args: DeleteKeywordArgs, config: &Config) -> Result<()> {
    let client = HttpCatalogClient::from_config(config)?;
    let mut editor = load_editor(&client).await?;
    let summary = delete_with(&mut editor, &client, &args).await?;
    print_saved(&summary, editor.catalog(), config)
}

/// Adds a keyword through `editor`, returning a one-line summary.
///
/// # Errors
///
/// Returns the editor's rejection or save failure.
pub async fn add_with(
    editor: &mut AdminEditor,
    api: &dyn CatalogApi,
    args: &AddKeywordArgs,
) -> Result<String> {
    editor.begin_add_keyword(&args.category_id)?;
    editor.set_label(args.label.as_str())?;
    editor.set_template(args.template.as_str())?;
    editor.submit(api).await?;
    Ok(format!(
        "added keyword {} ({}) to {}",
        args.label.trim(),
        derive_id(&args.label),
        args.category_id
    ))
}

/// Edits a keyword through `editor`, returning a one-line summary.
///
/// # Errors
///
/// Returns the editor's rejection or save failure.
pub async fn edit_with(
    editor: &mut AdminEditor,
    api: &dyn CatalogApi,
    args: &EditKeywordArgs,
) -> Result<String> {
    editor.begin_edit_keyword(&args.category_id, &args.keyword_id)?;
    if let Some(label) = &args.label {
        editor.set_label(label.as_str())?;
    }
    if let Some(template) = &args.template {
        editor.set_template(template.as_str())?;
    }
    editor.submit(api).await?;
    Ok(format!(
        "updated keyword {} in {}",
        args.keyword_id, args.category_id
    ))
}

/// Deletes a keyword through `editor`, returning a one-line summary.
///
/// # Errors
///
/// Returns the editor's rejection or save failure.
pub async fn delete_with(
    editor: &mut AdminEditor,
    api: &dyn CatalogApi,
    args: &DeleteKeywordArgs,
) -> Result<String> {
    let present = editor
        .catalog()
        .category(&args.category_id)
        .is_some_and(|c| c.has_keyword(&args.keyword_id));
    if !present {
        tracing::warn!(
            category_id = %args.category_id,
            keyword_id = %args.keyword_id,
            "keyword not present; saving unchanged catalog"
        );
    }
    editor
        .delete_keyword(api, &args.category_id, &args.keyword_id)
        .await?;
    Ok(format!(
        "deleted keyword {} from {}",
        args.keyword_id, args.category_id
    ))
}
