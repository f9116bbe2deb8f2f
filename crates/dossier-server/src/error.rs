//! Server error types.

use dossier::ProfileError;
use dossier_config::ConfigError;
use thiserror::Error;

use crate::auth::TokenError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while handling a request or building the handler.
///
/// Token and principal-resolution failures are absorbed by the
/// authentication gate and never reach a response.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The profile use case failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// The request could not be parsed or has invalid parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No route matches the path.
    #[error("no route for {0}")]
    RouteNotFound(String),

    /// The route exists but not for this method.
    #[error("method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Token settings are unusable.
    #[error("token configuration error: {0}")]
    Token(#[from] TokenError),

    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A response body could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ServerError {
    /// HTTP status for this error.
    ///
    /// A denial is 403 for an authenticated caller and 401 for an anonymous
    /// one; either way it stays distinct from 404.
    pub fn status(&self, authenticated: bool) -> u16 {
        match self {
            ServerError::Profile(ProfileError::Forbidden { .. }) => {
                if authenticated {
                    403
                } else {
                    401
                }
            }
            ServerError::Profile(ProfileError::ProfileNotFound)
            | ServerError::RouteNotFound(_) => 404,
            ServerError::Profile(ProfileError::Conflict { .. }) => 409,
            ServerError::BadRequest(_) => 400,
            ServerError::MethodNotAllowed { .. } => 405,
            ServerError::Profile(ProfileError::Storage(_))
            | ServerError::Token(_)
            | ServerError::Config(_)
            | ServerError::Encode(_) => 500,
        }
    }

    /// Message safe to return to the client.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Profile(ProfileError::Forbidden { .. }) => "Access denied".to_string(),
            ServerError::Profile(ProfileError::Storage(_))
            | ServerError::Token(_)
            | ServerError::Config(_)
            | ServerError::Encode(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
