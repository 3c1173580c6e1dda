//! Slug rules for content addressed by URL path segment.

use crate::domain::error::DomainError;

const MAX_SLUG_LEN: usize = 96;

/// Return the slug unchanged when it is safe to use as a file stem.
pub fn parse_slug(candidate: &str) -> Result<&str, DomainError> {
    if is_valid_slug(candidate) {
        Ok(candidate)
    } else {
        Err(DomainError::InvalidSlug(candidate.to_string()))
    }
}

/// A slug is 1–96 chars of lowercase ascii letters, digits and single inner
/// hyphens. Anything else never reaches the filesystem.
pub fn is_valid_slug(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.len() > MAX_SLUG_LEN {
        return false;
    }
    if candidate.starts_with('-') || candidate.ends_with('-') || candidate.contains("--") {
        return false;
    }

    candidate
        .bytes()
        .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-')
}
