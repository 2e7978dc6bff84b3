//! Authentication handling for Pipeline Roller
//!
//! This crate owns the credentials used to talk to the Azure DevOps REST API.
//! Two schemes are in use:
//!
//! - **Bearer**: the `System.AccessToken` handed to a running pipeline, used for
//!   pull-request comments and attachments.
//! - **Personal access token**: a user supplied PAT sent as HTTP Basic auth with
//!   an empty user name, used for repository provisioning.
//!
//! Tokens are held as [`secrecy::SecretString`] values and are only exposed when
//! an `Authorization` header is built.

mod credential;

pub use credential::Credential;

/// Result type for authentication operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while building credentials
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token was empty or contained only whitespace.
    #[error("Invalid credentials provided: {0}")]
    InvalidCredentials(String),

    /// The token contains characters that cannot be sent in an HTTP header.
    #[error("Token contains characters that are not valid in an HTTP header")]
    InvalidHeaderCharacters,
}
