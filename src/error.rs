//! # Error Module
//!
//! Every failure the API client can surface, as one enum.
//!
//! The variants map onto the distinct user-facing cases: acting without a
//! stored credential, the server rejecting the credential, a structured
//! error body, a request that never got a response, and everything else
//! that went wrong while building or decoding a request.
//!
//! Callers match on [`ApiError`] when they need to branch (the chat loop
//! does, to word its message), and otherwise just display it.

use thiserror::Error;

/// Failures surfaced by [`crate::api::ApiClient`] and the flows built on it.
#[derive(Error, Debug)]
pub enum ApiError {
    /// An authenticated call was attempted with no stored token.
    ///
    /// This is terminal for the attempted action and is never sent to the
    /// server; the fix is to log in, not to retry.
    #[error("not logged in; run `botdeck login` first")]
    MissingCredential,

    /// The server rejected the stored token (HTTP 401).
    ///
    /// By the time this is returned the credential has already been cleared
    /// centrally; the whole session is invalid, whichever endpoint tripped it.
    #[error("session expired or invalid; please log in again")]
    Unauthorized,

    /// A client-side check failed before any request was built (required
    /// fields, registration minimums). Nothing was sent to the server.
    #[error("{0}")]
    Invalid(String),

    /// The server answered with an error body.
    ///
    /// `detail` carries the most specific message the response offered,
    /// verbatim (a `detail` string, a flattened validation list, or a
    /// `message` field).
    #[error("server error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// The request was sent but no usable response came back.
    #[error("could not reach the server; check your connection and API base URL")]
    Network(#[source] reqwest::Error),

    /// Request construction or response decoding failed client-side.
    #[error("unexpected error: {0}")]
    Unexpected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest reports transport failures (connect/timeout) distinctly
        // from body/decode problems; only the former count as "network".
        if err.is_connect() || err.is_timeout() || err.is_request() {
            ApiError::Network(err)
        } else {
            ApiError::Unexpected(err.to_string())
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_fix() {
        let msg = ApiError::MissingCredential.to_string();
        assert!(msg.contains("login"));
    }

    #[test]
    fn api_error_surfaces_status_and_detail_verbatim() {
        let err = ApiError::Api {
            status: 422,
            detail: "username: too short".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("username: too short"));
    }
}
