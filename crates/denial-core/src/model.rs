//! Catalog data model.
//!
//! A [`Catalog`] is the only persisted aggregate. It is read and written as a
//! whole snapshot; there is no partial update at the storage layer.
//!
//! ```text
//! Catalog
//!   └── Category { id, label }
//!         └── Keyword { id, label, template }
//! ```
//!
//! Category ids are unique across the catalog. Keyword ids are unique only
//! within their own category; two categories may each hold a keyword with the
//! same id. Vector order is display order.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named template entry whose body is the denial reason text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Keyword {
    /// Identifier derived from the label at creation time.
    pub id: String,
    /// Display name.
    pub label: String,
    /// Denial reason text handed to support agents.
    pub template: String,
}

impl Keyword {
    /// Creates a keyword from its parts.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            template: template.into(),
        }
    }
}

/// A named grouping of keyword templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Identifier derived from the label at creation time.
    pub id: String,
    /// Display name.
    pub label: String,
    /// Keywords in display order.
    pub keywords: Vec<Keyword>,
}

impl Category {
    /// Creates an empty category.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            keywords: Vec::new(),
        }
    }

    /// Returns the keyword with the given id.
    #[must_use]
    pub fn keyword(&self, keyword_id: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.id == keyword_id)
    }

    /// Returns true if a keyword with this id exists in the category.
    #[must_use]
    pub fn has_keyword(&self, keyword_id: &str) -> bool {
        self.keyword(keyword_id).is_some()
    }
}

/// The full set of categories; the unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Catalog {
    /// Categories in display order.
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the category with the given id.
    #[must_use]
    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Returns true if a category with this id exists.
    #[must_use]
    pub fn has_category(&self, category_id: &str) -> bool {
        self.category(category_id).is_some()
    }

    /// Returns the first keyword with the given id, scanning categories in order.
    ///
    /// Keyword ids are only unique per category, so this is a convenience for
    /// selectors that address keywords by id alone.
    #[must_use]
    pub fn keyword_by_id(&self, keyword_id: &str) -> Option<(&Category, &Keyword)> {
        self.categories
            .iter()
            .find_map(|c| c.keyword(keyword_id).map(|k| (c, k)))
    }

    /// Total number of keywords across all categories.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.categories.iter().map(|c| c.keywords.len()).sum()
    }

    /// Returns true when the catalog holds no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut quality = Category::new("image-quality", "Image Quality");
        quality
            .keywords
            .push(Keyword::new("blurry", "Blurry", "Photo is blurry."));
        let mut docs = Category::new("documents", "Documents");
        docs.keywords
            .push(Keyword::new("blurry", "Blurry", "Document scan is blurry."));
        docs.keywords
            .push(Keyword::new("expired", "Expired", "Document has expired."));
        Catalog {
            categories: vec![quality, docs],
        }
    }

    #[test]
    fn keyword_by_id_returns_first_match() {
        let catalog = catalog();
        let (category, keyword) = catalog.keyword_by_id("blurry").expect("keyword");
        assert_eq!(category.id, "image-quality");
        assert_eq!(keyword.template, "Photo is blurry.");
    }

    #[test]
    fn keyword_by_id_searches_later_categories() {
        let catalog = catalog();
        let (category, _) = catalog.keyword_by_id("expired").expect("keyword");
        assert_eq!(category.id, "documents");
        assert!(catalog.keyword_by_id("missing").is_none());
    }

    #[test]
    fn keyword_count_totals_all_categories() {
        assert_eq!(catalog().keyword_count(), 3);
        assert_eq!(Catalog::new().keyword_count(), 0);
    }

    #[test]
    fn serializes_to_exact_shape() {
        let json = serde_json::to_value(catalog()).expect("serialize");
        assert_eq!(
            json["categories"][0],
            serde_json::json!({
                "id": "image-quality",
                "label": "Image Quality",
                "keywords": [{"id": "blurry", "label": "Blurry", "template": "Photo is blurry."}]
            })
        );
    }
}
