// src/utils/validation.rs

//! Field rules shared by the request DTOs.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use validator::ValidationError;

/// Letters, digits and `@ . + - _`, the usual account-name alphabet.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username regex is valid"));

/// Rejects publication years later than the current calendar year (UTC).
pub fn validate_publication_year(year: i32) -> Result<(), ValidationError> {
    check_publication_year(year, Utc::now().year())
}

fn check_publication_year(year: i32, current_year: i32) -> Result<(), ValidationError> {
    if year > current_year {
        let mut err = ValidationError::new("future_publication_year");
        err.message = Some(
            format!("Publication year cannot be in the future (>{current_year}).").into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Comments must contain something other than whitespace.
pub fn validate_comment_content(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("empty_comment");
        err.message = Some("Comment cannot be empty.".into());
        return Err(err);
    }
    Ok(())
}

/// Rejects blank strings (whitespace only).
pub fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !USERNAME_RE.is_match(username) {
        let mut err = ValidationError::new("invalid_username");
        err.message =
            Some("Username may contain only letters, digits and @/./+/-/_ characters.".into());
        return Err(err);
    }
    Ok(())
}

/// Splits a comma separated tag list into trimmed, non-empty, unique names.
///
/// Names keep their case; `"Rust"` and `"rust"` are different tags. The
/// result is sorted so repeated saves produce the same association order.
pub fn parse_tag_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
