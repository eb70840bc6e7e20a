//! Identifier derivation for categories and keywords.
//!
//! Identifiers are never chosen by the caller. They are computed once from the
//! label at creation time and stay fixed for the lifetime of the entry, even if
//! the label is later edited.
//!
//! Derivation rules:
//! - ASCII letters are lower-cased
//! - every maximal run of characters outside `[a-z0-9]` becomes a single `-`
//! - leading and trailing `-` are stripped
//!
//! # Example
//!
//! ```rust
//! use denial_core::id::derive_id;
//!
//! assert_eq!(derive_id("Blurry Photos!"), "blurry-photos");
//! assert_eq!(derive_id(" Image  Quality "), "image-quality");
//! ```

/// Derives the identifier for a label.
///
/// The result contains only `[a-z0-9-]`, never starts or ends with `-`, and
/// never contains two consecutive `-`. It may be empty when the label has no
/// ASCII alphanumeric characters; callers creating entries must reject that.
///
/// Non-ASCII letters are treated as separators, so `"Café"` derives `"caf"`.
#[must_use]
pub fn derive_id(label: &str) -> String {
    let mut id = String::with_capacity(label.len());
    let mut pending_separator = false;

    for ch in label.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !id.is_empty() {
                id.push('-');
            }
            pending_separator = false;
            id.push(ch);
        } else {
            pending_separator = true;
        }
    }

    id
}

/// Returns true if `id` is already in derived form.
#[must_use]
pub fn is_derived(id: &str) -> bool {
    !id.is_empty() && derive_id(id) == id
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derives_from_mixed_label() {
        assert_eq!(derive_id("Blurry Photos!"), "blurry-photos");
        assert_eq!(derive_id("Image Quality"), "image-quality");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(derive_id("a  --  b"), "a-b");
        assert_eq!(derive_id("Wrong___Size//Format"), "wrong-size-format");
    }

    #[test]
    fn strips_leading_and_trailing_separators() {
        assert_eq!(derive_id("  !!hello!!  "), "hello");
        assert_eq!(derive_id("-x-"), "x");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(derive_id("Under 18 Years"), "under-18-years");
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(derive_id("Café Ölfarbe"), "caf-lfarbe");
    }

    #[test]
    fn punctuation_only_label_derives_empty() {
        assert_eq!(derive_id("!!!"), "");
        assert_eq!(derive_id("   "), "");
        assert!(!is_derived(""));
    }

    proptest! {
        #[test]
        fn derive_is_idempotent(label in ".{0,64}") {
            let once = derive_id(&label);
            prop_assert_eq!(derive_id(&once), once.clone());
        }

        #[test]
        fn derived_ids_use_restricted_alphabet(label in ".{0,64}") {
            let id = derive_id(&label);
            prop_assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!id.starts_with('-'));
            prop_assert!(!id.ends_with('-'));
            prop_assert!(!id.contains("--"));
        }

        #[test]
        fn case_does_not_affect_id(label in "[a-zA-Z0-9 ]{0,32}") {
            prop_assert_eq!(derive_id(&label.to_uppercase()), derive_id(&label.to_lowercase()));
        }
    }
}
