//! Custom assertion helpers for catalog tests.

use std::collections::HashSet;

use denial_core::{Catalog, derive_id};

/// Asserts the catalog invariants that every successful mutation preserves.
///
/// # Panics
///
/// Panics if an id is empty or not in derived form, category ids repeat, or
/// keyword ids repeat within a category.
pub fn assert_catalog_invariants(catalog: &Catalog) {
    let mut category_ids = HashSet::new();
    for category in &catalog.categories {
        assert!(!category.id.is_empty(), "category has empty id");
        assert_eq!(
            derive_id(&category.id),
            category.id,
            "category id {:?} is not in derived form",
            category.id
        );
        assert!(
            category_ids.insert(category.id.as_str()),
            "duplicate category id {:?}",
            category.id
        );

        let mut keyword_ids = HashSet::new();
        for keyword in &category.keywords {
            assert!(
                !keyword.id.is_empty(),
                "keyword in {:?} has empty id",
                category.id
            );
            assert!(
                keyword_ids.insert(keyword.id.as_str()),
                "duplicate keyword id {:?} in category {:?}",
                keyword.id,
                category.id
            );
            assert!(!keyword.label.trim().is_empty(), "keyword has empty label");
            assert!(
                !keyword.template.trim().is_empty(),
                "keyword has empty template"
            );
        }
    }
}

/// Asserts that `catalog` is exactly the single Image Quality / Blurry catalog.
///
/// # Panics
///
/// Panics if the catalog differs.
pub fn assert_image_quality_catalog(catalog: &Catalog) {
    assert_eq!(catalog, &crate::fixtures::image_quality_catalog());
}
