/*
 * Recognition, extraction and validation of UUID-shaped identifiers.
 *
 * Account and tag identifiers are UUIDs (8-4-4-4-12 hexadecimal groups, any
 * case). The same pattern is used to pull identifiers out of free text
 * (clipboard contents, typed or pasted input) and to validate the form fields
 * before a conversion request is sent.
 */
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("UUID pattern is a valid regex")
});

static UUID_EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("UUID pattern is a valid regex")
});

const TAG_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingAccount,
    InvalidAccount,
    InvalidTag(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingAccount => write!(f, "Please fill in all required fields"),
            ValidationError::InvalidAccount => {
                write!(f, "Invalid Account ID format. Expected UUID format.")
            }
            ValidationError::InvalidTag(tag) => {
                write!(f, "Invalid Tag ID format: '{tag}'. Expected UUID format.")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// Identifiers that passed `validate_submission`, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedIds {
    pub account_id: String,
    pub tag_ids: Vec<String>,
}

impl ValidatedIds {
    // The wire form of the tag list; `None` when no tags are selected.
    pub fn tag_ids_field(&self) -> Option<String> {
        if self.tag_ids.is_empty() {
            None
        } else {
            Some(join_tag_ids(&self.tag_ids))
        }
    }
}

pub fn is_uuid(text: &str) -> bool {
    UUID_EXACT.is_match(text)
}

pub fn ids_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/*
 * Finds every UUID-shaped token anywhere in `text`. Matches are de-duplicated
 * case-insensitively; the first occurrence wins, keeping its position and its
 * original casing.
 */
pub fn extract_uuids(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    UUID_PATTERN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|candidate| seen.insert(candidate.to_ascii_lowercase()))
        .map(str::to_string)
        .collect()
}

/*
 * Splits a comma-separated selection string into its tokens: trimmed, empty
 * tokens dropped, duplicates (case-insensitive) removed, order preserved.
 * Tokens are not required to be UUID-shaped.
 */
pub fn parse_tag_ids(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(token.to_ascii_lowercase()))
        .map(str::to_string)
        .collect()
}

pub fn join_tag_ids<S: AsRef<str>>(ids: &[S]) -> String {
    ids.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(TAG_SEPARATOR)
}

// First 4 characters, an ellipsis, last 4 characters. Short ids are returned as-is.
pub fn format_uuid_short(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() < 8 {
        return id.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/*
 * Validates the account and tag fields as they will be submitted. The account
 * must be present and exactly UUID-shaped; every tag token, if any, must be
 * exactly UUID-shaped. The first failure is reported.
 */
pub fn validate_submission(
    account: &str,
    tags: &str,
) -> std::result::Result<ValidatedIds, ValidationError> {
    let account_id = account.trim();
    if account_id.is_empty() {
        return Err(ValidationError::MissingAccount);
    }
    if !is_uuid(account_id) {
        return Err(ValidationError::InvalidAccount);
    }
    let tag_ids = parse_tag_ids(tags);
    if let Some(bad) = tag_ids.iter().find(|tag| !is_uuid(tag)) {
        return Err(ValidationError::InvalidTag(bad.clone()));
    }
    Ok(ValidatedIds {
        account_id: account_id.to_string(),
        tag_ids,
    })
}
