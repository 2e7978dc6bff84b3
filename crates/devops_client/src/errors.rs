//! Error types for Azure DevOps client operations.
//!
//! This module defines the errors that can occur when talking to the Azure DevOps
//! REST API through the devops_client crate.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during Azure DevOps client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use devops_client::Error;
///
/// match client.create_thread(&target, &thread).await {
///     Ok(()) => println!("Comment posted"),
///     Err(Error::UnexpectedStatus { status, .. }) => eprintln!("Rejected with {}", status),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP client could not be initialized or the credential could not be
    /// turned into a header.
    #[error("Failed to authenticate or initialize Azure DevOps client: {0}")]
    AuthError(String),

    /// The response body did not match the expected structure.
    #[error("Failed to deserialize Azure DevOps response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A request URL could not be built from the configured endpoint.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete (connection, TLS, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a status the operation does not accept.
    ///
    /// The reason phrase and response body are kept for logging.
    #[error("Unexpected HTTP status {status} ({reason})")]
    UnexpectedStatus {
        status: u16,
        reason: String,
        body: String,
    },
}

impl Error {
    /// The HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
