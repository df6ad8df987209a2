use thiserror::Error;

/// Failure talking to the backend. `Http` carries the status code and the
/// raw error body so callers can surface both.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("login succeeded but role {0:?} is not recognized")]
    UnknownRole(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Caught before any request is made; shown inline next to the offending
/// field rather than as a request failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} does not look like an email address")]
    BadEmail(&'static str),

    #[error("passwords do not match")]
    PasswordMismatch,
}
