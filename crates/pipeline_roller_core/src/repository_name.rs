//! Validated Azure Repos repository names.

use crate::errors::ValidationError;

#[cfg(test)]
#[path = "repository_name_tests.rs"]
mod tests;

const MAX_LENGTH: usize = 64;

/// Characters Azure Repos rejects anywhere in a repository name.
const RESERVED_CHARACTERS: &[char] = &[
    '\\', '/', ':', '*', '?', '"', '<', '>', '|', ';', '#', '$', '{', '}', ',', '+', '=', '[', ']',
];

/// A repository name accepted by Azure Repos.
///
/// # Validation Rules
/// - Length: 1-64 characters
/// - No control characters and none of `\ / : * ? " < > | ; # $ { } , + = [ ]`
/// - Must not start with `_` or `.`, must not end with `.`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("repository_name"));
        }

        let length = name.chars().count();
        if length > MAX_LENGTH {
            return Err(ValidationError::too_long(
                "repository_name",
                length,
                MAX_LENGTH,
            ));
        }

        if name.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "repository_name",
                "must not contain control characters",
            ));
        }

        if let Some(c) = name.chars().find(|c| RESERVED_CHARACTERS.contains(c)) {
            return Err(ValidationError::invalid_format(
                "repository_name",
                format!("must not contain '{}'", c),
            ));
        }

        if name.starts_with('_') || name.starts_with('.') || name.ends_with('.') {
            return Err(ValidationError::invalid_format(
                "repository_name",
                "must not start with '_' or '.' or end with '.'",
            ));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RepositoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
