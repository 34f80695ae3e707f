use std::path::PathBuf;

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the library can report. Provider-side failures carry the
/// HTTP status so callers can print the same diagnostics the CLI always has,
/// without resorting to empty-value sentinels.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("credential file {0} does not exist")]
    MissingCredentialFile(PathBuf),

    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("authorization cancelled")]
    Cancelled,

    #[error("verifier length {0} is outside the allowed range 43..=128")]
    VerifierLength(usize),

    #[error("token exchange failed with status {0}")]
    TokenExchangeFailed(StatusCode),

    #[error("token refresh failed with status {0}")]
    RefreshFailed(StatusCode),

    #[error("api request failed with status {status}: {body}")]
    ApiRequestFailed { status: StatusCode, body: String },

    #[error("response is missing expected fields: {0}")]
    MalformedResponse(String),

    #[error("url could not be parsed: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("error url-encoding authorization query: {0}")]
    UrlEncode(#[from] serde_urlencoded::ser::Error),

    #[error("access token is not a valid header value: {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
