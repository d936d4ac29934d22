// src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end a run. Each variant is terminal: the binary prints
/// it once and exits with [`Error::exit_code`].
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting was not supplied by any source.
    #[error("missing {what}: {hint}")]
    ConfigMissing { what: &'static str, hint: String },

    #[error("invalid {what} `{value}`: {reason}")]
    ConfigInvalid {
        what: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid Confluence URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server rejected the credentials (401/403).
    #[error("authentication failed for {url}: status={status}, body_head={excerpt}")]
    Auth {
        url: String,
        status: u16,
        excerpt: String,
    },

    /// Every candidate content URL answered 404.
    #[error("page {page_id} not found (tried {tried}): body_head={excerpt}")]
    NotFound {
        page_id: String,
        tried: String,
        excerpt: String,
    },

    #[error("unexpected response from {url}: status={status}, body_head={excerpt}")]
    Http {
        url: String,
        status: u16,
        excerpt: String,
    },

    /// A 200 response whose JSON lacks `body.storage.value`.
    #[error("could not read page body from {url}: {reason}; body_head={excerpt}")]
    Payload {
        url: String,
        reason: String,
        excerpt: String,
    },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no table found in page content")]
    NoTable,

    #[error("column `{column}` not found; available columns: [{}]", .available.join(", "))]
    ColumnMissing {
        column: String,
        available: Vec<String>,
    },

    #[error("reading {what} from the terminal failed: {source}")]
    Prompt {
        what: &'static str,
        #[source]
        source: dialoguer::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for this kind of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigMissing { .. }
            | Error::ConfigInvalid { .. }
            | Error::InvalidUrl { .. } => 2,
            Error::Auth { .. } => 3,
            Error::NotFound { .. } => 4,
            Error::Http { .. } | Error::Payload { .. } | Error::Network { .. } => 5,
            Error::NoTable => 6,
            Error::ColumnMissing { .. } => 7,
            Error::Prompt { .. } | Error::Io(_) => 1,
        }
    }
}

/// First 200 characters of a response body on one line.
pub(crate) fn excerpt(body: &str) -> String {
    body.chars()
        .take(200)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
