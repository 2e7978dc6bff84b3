//! Azure DevOps credentials
//!
//! Provides [`Credential`], the single authentication value handed to the
//! DevOps client.

use base64::{engine::general_purpose::STANDARD, Engine};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::{AuthError, AuthResult};

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;

/// An Azure DevOps credential.
///
/// # Examples
///
/// ```rust
/// use auth_handler::Credential;
/// use secrecy::ExposeSecret;
///
/// let credential = Credential::bearer("pipeline-token").unwrap();
/// assert_eq!(
///     credential.authorization_header().expose_secret(),
///     "Bearer pipeline-token"
/// );
/// ```
#[derive(Debug)]
pub enum Credential {
    /// OAuth style token, sent as `Authorization: Bearer <token>`.
    Bearer(SecretString),

    /// Personal access token, sent as `Authorization: Basic base64(":<token>")`.
    PersonalAccessToken(SecretString),
}

impl Credential {
    /// Create a bearer credential from a pipeline access token.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidCredentials` if the token is blank and
    /// `AuthError::InvalidHeaderCharacters` if it contains control characters.
    pub fn bearer(token: impl Into<String>) -> AuthResult<Self> {
        let token = validate_token(token.into())?;
        debug!(token_length = token.len(), "Created bearer credential");
        Ok(Self::Bearer(SecretString::from(token)))
    }

    /// Create a credential from a personal access token.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidCredentials` if the token is blank and
    /// `AuthError::InvalidHeaderCharacters` if it contains control characters.
    pub fn personal_access_token(token: impl Into<String>) -> AuthResult<Self> {
        let token = validate_token(token.into())?;
        debug!(
            token_length = token.len(),
            "Created personal access token credential"
        );
        Ok(Self::PersonalAccessToken(SecretString::from(token)))
    }

    /// Name of the authentication scheme, safe to log.
    pub fn scheme(&self) -> &'static str {
        match self {
            Credential::Bearer(_) => "Bearer",
            Credential::PersonalAccessToken(_) => "Basic",
        }
    }

    /// Build the value of the `Authorization` header for this credential.
    pub fn authorization_header(&self) -> SecretString {
        let value = match self {
            Credential::Bearer(token) => format!("Bearer {}", token.expose_secret()),
            Credential::PersonalAccessToken(token) => {
                let encoded = STANDARD.encode(format!(":{}", token.expose_secret()));
                format!("Basic {}", encoded)
            }
        };
        SecretString::from(value)
    }
}

fn validate_token(token: String) -> AuthResult<String> {
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(AuthError::InvalidCredentials(
            "access token must not be empty".to_string(),
        ));
    }

    if token.chars().any(|c| c.is_control()) {
        return Err(AuthError::InvalidHeaderCharacters);
    }

    Ok(token)
}
