use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the Pipeline Roller CLI application.
///
/// Every variant ends the process with a non-zero exit code. Failures of
/// individual remote calls inside a workflow are logged by the workflow and do
/// not surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// A credential could not be built from the supplied token.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The application config file or a required setting is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The environment config or the pipeline variables could not be loaded.
    #[error(transparent)]
    Configuration(#[from] config_manager::ConfigurationError),

    /// The Azure DevOps client could not be created.
    #[error(transparent)]
    Client(#[from] devops_client::Error),

    /// A workflow failed in a way it cannot report as a logged outcome.
    #[error(transparent)]
    Workflow(#[from] pipeline_roller_core::Error),
}

impl From<auth_handler::AuthError> for Error {
    fn from(e: auth_handler::AuthError) -> Self {
        Error::Auth(e.to_string())
    }
}
