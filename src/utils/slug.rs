//! Slug validation and derivation.
//!
//! Link slugs are user-chosen and validated; tag and display-name slugs are
//! derived from free text with [`slugify`].

use std::sync::LazyLock;

use regex::Regex;

use crate::error::StoreError;

/// Slugs that would shadow system routes.
pub const RESERVED_SLUGS: &[&str] = &["auth", "static", "dashboard", "admin"];

/// Longest accepted link slug.
pub const MAX_SLUG_LENGTH: usize = 64;

/// Longest accepted tag display name, in characters.
pub const MAX_TAG_NAME_LENGTH: usize = 100;

static SLUG_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$").unwrap());

/// Normalizes and validates a link slug.
///
/// The slug is lowercased first, so `Go-Docs` and `go-docs` name the same
/// link. Pure function: no I/O happens here.
///
/// # Rules
///
/// - First and last character in `[a-z0-9]`
/// - Interior characters in `[a-z0-9-]`
/// - At most [`MAX_SLUG_LENGTH`] characters
/// - Not one of [`RESERVED_SLUGS`]
///
/// # Errors
///
/// Returns [`StoreError::InvalidSlug`] or [`StoreError::ReservedSlug`].
pub fn validate_slug(raw: &str) -> Result<String, StoreError> {
    let slug = raw.to_ascii_lowercase();

    if slug.is_empty() {
        return Err(StoreError::InvalidSlug {
            slug,
            reason: "slug must not be empty",
        });
    }

    if slug.len() > MAX_SLUG_LENGTH {
        return Err(StoreError::InvalidSlug {
            slug,
            reason: "slug must be at most 64 characters",
        });
    }

    if !SLUG_FORMAT.is_match(&slug) {
        return Err(StoreError::InvalidSlug {
            slug,
            reason: "use lowercase letters, digits and inner hyphens only",
        });
    }

    if RESERVED_SLUGS.contains(&slug.as_str()) {
        return Err(StoreError::ReservedSlug(slug));
    }

    Ok(slug)
}

/// Derives a URL-safe slug from free text.
///
/// Lowercases, turns whitespace runs into a single hyphen, drops anything
/// outside `[a-z0-9-]`, collapses repeated hyphens and trims hyphens from
/// both ends. May return an empty string.
///
/// ```ignore
/// assert_eq!(slugify("Engineering Tools"), "engineering-tools");
/// assert_eq!(slugify("  C++ / Rust!  "), "c-rust");
/// ```
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
            continue;
        }
        if !(ch.is_ascii_lowercase() || ch.is_ascii_digit()) {
            continue;
        }
        if pending_hyphen && !out.is_empty() {
            out.push('-');
        }
        pending_hyphen = false;
        out.push(ch);
    }

    out
}

/// Prepares a desired tag set: trims each name, skips blank ones, derives
/// slugs and keeps the first name seen for each slug.
///
/// Returns `(name, slug)` pairs in input order.
///
/// # Errors
///
/// Returns [`StoreError::InvalidTag`] for a name that is too long or has no
/// characters left after slugifying.
pub fn normalize_tag_names<S: AsRef<str>>(
    names: &[S],
) -> Result<Vec<(String, String)>, StoreError> {
    let mut out: Vec<(String, String)> = Vec::with_capacity(names.len());

    for raw in names {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        if name.chars().count() > MAX_TAG_NAME_LENGTH {
            return Err(StoreError::InvalidTag(name.to_string()));
        }

        let slug = slugify(name);
        if slug.is_empty() {
            return Err(StoreError::InvalidTag(name.to_string()));
        }
        if out.iter().any(|(_, existing)| *existing == slug) {
            continue;
        }
        out.push((name.to_string(), slug));
    }

    Ok(out)
}
