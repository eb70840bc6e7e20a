//! Pure catalog mutations.
//!
//! Every operation takes the current catalog by reference and returns a new
//! catalog; the input is never modified. Rejections happen before any change
//! is made, so a failed mutation leaves nothing half-applied.
//!
//! Identifier scoping:
//! - category ids are compared across the whole catalog
//! - keyword ids are compared only within their own category
//!
//! Labels and templates are trimmed before use. Updates keep the original id
//! even when the label changes.

use serde::{Deserialize, Serialize};

use denial_core::{Catalog, Category, Keyword, derive_id};

/// Result type for mutation-engine operations.
pub type MutationResult<T> = std::result::Result<T, MutationError>;

/// Reasons a mutation is rejected.
///
/// Messages are user-facing; the admin editor shows them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// Label is empty after trimming.
    #[error("Label is required")]
    EmptyLabel,

    /// Template is empty after trimming.
    #[error("Template is required")]
    EmptyTemplate,

    /// Label has no characters that survive id derivation.
    #[error("Label must contain at least one letter or digit")]
    EmptyIdentifier,

    /// A category with the same derived id already exists.
    #[error("Category with this name already exists")]
    DuplicateCategory {
        /// The colliding id.
        id: String,
    },

    /// A keyword with the same derived id already exists in the category.
    #[error("Keyword with this label already exists in this category")]
    DuplicateKeyword {
        /// Category that holds the collision.
        category_id: String,
        /// The colliding id.
        id: String,
    },

    /// The addressed category does not exist.
    #[error("Category not found: {category_id}")]
    CategoryNotFound {
        /// The id that was looked up.
        category_id: String,
    },

    /// The addressed keyword does not exist in the category.
    #[error("Keyword not found: {keyword_id}")]
    KeywordNotFound {
        /// Category that was searched.
        category_id: String,
        /// The id that was looked up.
        keyword_id: String,
    },
}

/// Appends a new, empty category.
///
/// # Errors
///
/// Rejects an empty label, a label deriving an empty id, or a duplicate id.
pub fn add_category(catalog: &Catalog, label: &str) -> MutationResult<Catalog> {
    let label = required_label(label)?;
    let id = required_id(label)?;
    if catalog.has_category(&id) {
        return Err(MutationError::DuplicateCategory { id });
    }

    let mut next = catalog.clone();
    next.categories.push(Category::new(id, label));
    Ok(next)
}

/// Appends a keyword to an existing category.
///
/// # Errors
///
/// Rejects a missing category, an empty label or template, a label deriving
/// an empty id, or a duplicate id within the category.
pub fn add_keyword(
    catalog: &Catalog,
    category_id: &str,
    label: &str,
    template: &str,
) -> MutationResult<Catalog> {
    let category_index = category_index(catalog, category_id)?;
    let label = required_label(label)?;
    let template = required_template(template)?;
    let id = required_id(label)?;

    if catalog.categories[category_index].has_keyword(&id) {
        return Err(MutationError::DuplicateKeyword {
            category_id: category_id.to_string(),
            id,
        });
    }

    let mut next = catalog.clone();
    next.categories[category_index]
        .keywords
        .push(Keyword::new(id, label, template));
    Ok(next)
}

/// Replaces a category's label; its id is unchanged.
///
/// # Errors
///
/// Rejects an empty label or a missing category.
pub fn update_category_label(
    catalog: &Catalog,
    category_id: &str,
    label: &str,
) -> MutationResult<Catalog> {
    let label = required_label(label)?;
    let category_index = category_index(catalog, category_id)?;

    let mut next = catalog.clone();
    next.categories[category_index].label = label.to_string();
    Ok(next)
}

/// Replaces a keyword's label and template; its id is unchanged.
///
/// # Errors
///
/// Rejects an empty label or template, or a missing category or keyword.
pub fn update_keyword(
    catalog: &Catalog,
    category_id: &str,
    keyword_id: &str,
    label: &str,
    template: &str,
) -> MutationResult<Catalog> {
    let label = required_label(label)?;
    let template = required_template(template)?;
    let category_index = category_index(catalog, category_id)?;
    let keyword_index = catalog.categories[category_index]
        .keywords
        .iter()
        .position(|k| k.id == keyword_id)
        .ok_or_else(|| MutationError::KeywordNotFound {
            category_id: category_id.to_string(),
            keyword_id: keyword_id.to_string(),
        })?;

    let mut next = catalog.clone();
    let keyword = &mut next.categories[category_index].keywords[keyword_index];
    keyword.label = label.to_string();
    keyword.template = template.to_string();
    Ok(next)
}

/// Removes a category and its keywords. Absent ids are a no-op.
#[must_use]
pub fn delete_category(catalog: &Catalog, category_id: &str) -> Catalog {
    Catalog {
        categories: catalog
            .categories
            .iter()
            .filter(|c| c.id != category_id)
            .cloned()
            .collect(),
    }
}

/// Removes a keyword from a category. Absent ids are a no-op.
#[must_use]
pub fn delete_keyword(catalog: &Catalog, category_id: &str, keyword_id: &str) -> Catalog {
    let mut next = catalog.clone();
    if let Some(category) = next.categories.iter_mut().find(|c| c.id == category_id) {
        category.keywords.retain(|k| k.id != keyword_id);
    }
    next
}

/// A catalog mutation carried as data.
///
/// Lets callers hold a pending operation (an open editor form, a CLI command)
/// and apply it later against whatever catalog is current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CatalogMutation {
    /// See [`add_category`].
    AddCategory {
        /// New category label.
        label: String,
    },
    /// See [`add_keyword`].
    AddKeyword {
        /// Target category.
        category_id: String,
        /// New keyword label.
        label: String,
        /// New keyword template.
        template: String,
    },
    /// See [`update_category_label`].
    UpdateCategoryLabel {
        /// Target category.
        category_id: String,
        /// Replacement label.
        label: String,
    },
    /// See [`update_keyword`].
    UpdateKeyword {
        /// Category holding the keyword.
        category_id: String,
        /// Target keyword.
        keyword_id: String,
        /// Replacement label.
        label: String,
        /// Replacement template.
        template: String,
    },
    /// See [`delete_category`].
    DeleteCategory {
        /// Category to remove.
        category_id: String,
    },
    /// See [`delete_keyword`].
    DeleteKeyword {
        /// Category holding the keyword.
        category_id: String,
        /// Keyword to remove.
        keyword_id: String,
    },
}

impl CatalogMutation {
    /// Applies the mutation, returning the new catalog.
    ///
    /// # Errors
    ///
    /// Returns the same rejections as the corresponding free function.
    pub fn apply(&self, catalog: &Catalog) -> MutationResult<Catalog> {
        match self {
            Self::AddCategory { label } => add_category(catalog, label),
            Self::AddKeyword {
                category_id,
                label,
                template,
            } => add_keyword(catalog, category_id, label, template),
            Self::UpdateCategoryLabel { category_id, label } => {
                update_category_label(catalog, category_id, label)
            }
            Self::UpdateKeyword {
                category_id,
                keyword_id,
                label,
                template,
            } => update_keyword(catalog, category_id, keyword_id, label, template),
            Self::DeleteCategory { category_id } => Ok(delete_category(catalog, category_id)),
            Self::DeleteKeyword {
                category_id,
                keyword_id,
            } => Ok(delete_keyword(catalog, category_id, keyword_id)),
        }
    }

    /// Short operation name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddCategory { .. } => "add_category",
            Self::AddKeyword { .. } => "add_keyword",
            Self::UpdateCategoryLabel { .. } => "update_category_label",
            Self::UpdateKeyword { .. } => "update_keyword",
            Self::DeleteCategory { .. } => "delete_category",
            Self::DeleteKeyword { .. } => "delete_keyword",
        }
    }
}

fn required_label(label: &str) -> MutationResult<&str> {
    let label = label.trim();
    if label.is_empty() {
        return Err(MutationError::EmptyLabel);
    }
    Ok(label)
}

fn required_template(template: &str) -> MutationResult<&str> {
    let template = template.trim();
    if template.is_empty() {
        return Err(MutationError::EmptyTemplate);
    }
    Ok(template)
}

fn required_id(label: &str) -> MutationResult<String> {
    let id = derive_id(label);
    if id.is_empty() {
        return Err(MutationError::EmptyIdentifier);
    }
    Ok(id)
}

fn category_index(catalog: &Catalog, category_id: &str) -> MutationResult<usize> {
    catalog
        .categories
        .iter()
        .position(|c| c.id == category_id)
        .ok_or_else(|| MutationError::CategoryNotFound {
            category_id: category_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded() -> Catalog {
        let catalog = add_category(&Catalog::new(), "Image Quality").expect("add category");
        add_keyword(&catalog, "image-quality", "Blurry", "Photo is blurry.").expect("add keyword")
    }

    #[test]
    fn add_category_appends_with_derived_id() {
        let catalog = add_category(&seeded(), "  Wrong Document! ").expect("add");
        assert_eq!(catalog.categories.len(), 2);
        let added = &catalog.categories[1];
        assert_eq!(added.id, "wrong-document");
        assert_eq!(added.label, "Wrong Document!");
        assert!(added.keywords.is_empty());
        assert_eq!(catalog.categories[0], seeded().categories[0]);
    }

    #[test]
    fn add_category_rejects_duplicate_derived_id() {
        let before = seeded();
        let err = add_category(&before, "image QUALITY").unwrap_err();
        assert_eq!(
            err,
            MutationError::DuplicateCategory {
                id: "image-quality".into()
            }
        );
        assert_eq!(err.to_string(), "Category with this name already exists");
        assert_eq!(before, seeded());
    }

    #[test]
    fn add_category_rejects_blank_and_symbol_only_labels() {
        assert_eq!(
            add_category(&Catalog::new(), "   ").unwrap_err(),
            MutationError::EmptyLabel
        );
        assert_eq!(
            add_category(&Catalog::new(), "?!").unwrap_err(),
            MutationError::EmptyIdentifier
        );
    }

    #[test]
    fn add_keyword_trims_and_appends() {
        let catalog =
            add_keyword(&seeded(), "image-quality", " Too Dark ", "  Photo is too dark. ")
                .expect("add");
        let keywords = &catalog.categories[0].keywords;
        assert_eq!(keywords.len(), 2);
        assert_eq!(
            keywords[1],
            Keyword::new("too-dark", "Too Dark", "Photo is too dark.")
        );
    }

    #[test]
    fn add_keyword_rejects_empty_label_or_template() {
        let catalog = seeded();
        assert_eq!(
            add_keyword(&catalog, "image-quality", "", "text").unwrap_err(),
            MutationError::EmptyLabel
        );
        assert_eq!(
            add_keyword(&catalog, "image-quality", "Dark", "   ").unwrap_err(),
            MutationError::EmptyTemplate
        );
    }

    #[test]
    fn add_keyword_requires_existing_category() {
        let err = add_keyword(&seeded(), "missing", "Dark", "text").unwrap_err();
        assert!(matches!(err, MutationError::CategoryNotFound { .. }));
    }

    #[test]
    fn keyword_ids_are_scoped_per_category() {
        let catalog = add_category(&seeded(), "Documents").expect("add category");
        let catalog =
            add_keyword(&catalog, "documents", "Blurry", "Scan is blurry.").expect("same id ok");
        assert_eq!(catalog.categories[1].keywords[0].id, "blurry");

        let err = add_keyword(&catalog, "documents", "BLURRY", "again").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Keyword with this label already exists in this category"
        );
    }

    #[test]
    fn update_category_label_keeps_id() {
        let catalog =
            update_category_label(&seeded(), "image-quality", "  Photo Quality ").expect("update");
        assert_eq!(catalog.categories[0].id, "image-quality");
        assert_eq!(catalog.categories[0].label, "Photo Quality");
        assert_eq!(catalog.categories[0].keywords, seeded().categories[0].keywords);
    }

    #[test]
    fn update_category_label_rejects_empty_and_missing() {
        assert_eq!(
            update_category_label(&seeded(), "image-quality", " ").unwrap_err(),
            MutationError::EmptyLabel
        );
        assert!(matches!(
            update_category_label(&seeded(), "nope", "X").unwrap_err(),
            MutationError::CategoryNotFound { .. }
        ));
    }

    #[test]
    fn update_keyword_replaces_both_fields_in_place() {
        let catalog = update_keyword(
            &seeded(),
            "image-quality",
            "blurry",
            "Out of Focus",
            "Photo is out of focus.",
        )
        .expect("update");
        assert_eq!(
            catalog.categories[0].keywords[0],
            Keyword::new("blurry", "Out of Focus", "Photo is out of focus.")
        );
    }

    #[test]
    fn update_keyword_rejects_missing_keyword() {
        let err = update_keyword(&seeded(), "image-quality", "dark", "Dark", "text").unwrap_err();
        assert_eq!(
            err,
            MutationError::KeywordNotFound {
                category_id: "image-quality".into(),
                keyword_id: "dark".into()
            }
        );
    }

    #[test]
    fn deletes_are_idempotent() {
        let catalog = seeded();
        assert_eq!(delete_category(&catalog, "missing"), catalog);
        assert_eq!(delete_keyword(&catalog, "missing", "blurry"), catalog);
        assert_eq!(delete_keyword(&catalog, "image-quality", "missing"), catalog);

        let emptied = delete_keyword(&catalog, "image-quality", "blurry");
        assert!(emptied.categories[0].keywords.is_empty());
        assert!(delete_category(&catalog, "image-quality").is_empty());
    }

    #[test]
    fn command_apply_matches_free_functions() {
        let op = CatalogMutation::AddKeyword {
            category_id: "image-quality".into(),
            label: "Cropped".into(),
            template: "Photo is cropped.".into(),
        };
        assert_eq!(
            op.apply(&seeded()),
            add_keyword(&seeded(), "image-quality", "Cropped", "Photo is cropped.")
        );
        assert_eq!(op.name(), "add_keyword");
    }

    fn label() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 !?-]{0,12}"
    }

    proptest! {
        #[test]
        fn successful_mutations_preserve_unique_ids(labels in proptest::collection::vec(label(), 0..12)) {
            let mut catalog = Catalog::new();
            for label in &labels {
                if let Ok(next) = add_category(&catalog, label) {
                    prop_assert_eq!(next.categories.len(), catalog.categories.len() + 1);
                    catalog = next;
                }
                let target = catalog.categories.first().map(|c| c.id.clone());
                if let Some(category_id) = target {
                    if let Ok(next) = add_keyword(&catalog, &category_id, label, "template") {
                        catalog = next;
                    }
                }
            }

            let mut ids: Vec<_> = catalog.categories.iter().map(|c| c.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), catalog.categories.len());

            for category in &catalog.categories {
                prop_assert!(!category.id.is_empty());
                let mut keyword_ids: Vec<_> = category.keywords.iter().map(|k| k.id.as_str()).collect();
                keyword_ids.sort_unstable();
                keyword_ids.dedup();
                prop_assert_eq!(keyword_ids.len(), category.keywords.len());
            }
        }

        #[test]
        fn rejected_add_leaves_catalog_unchanged(label in label()) {
            let before = seeded();
            match add_category(&before, &label) {
                Ok(after) => prop_assert_eq!(after.categories.len(), before.categories.len() + 1),
                Err(_) => prop_assert_eq!(&before, &seeded()),
            }
        }
    }
}
