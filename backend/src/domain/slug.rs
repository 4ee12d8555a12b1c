//! Slug validation for category URLs.
//!
//! Slugs are non-empty, trimmed, and limited to lowercase ASCII letters,
//! digits, and hyphens.

/// Return `true` when `value` is a valid category slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    if value.is_empty() || value.trim() != value {
        return false;
    }
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
