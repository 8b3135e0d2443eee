//! Error types.
//!
//! [`SourceError`] is what a [`Source`](crate::source::Source) reports for a
//! single fetch; [`Error`] is what [`Client`](crate::Client) operations return.
//!
//! # Categories
//!
//! - **Not found**: `SourceError::NotFound`, `Error::AliasNotFound`
//! - **Transport**: `SourceError::{Http, Status, Io}`, wrapped in `Error::Source`
//! - **Inconsistent database**: `Error::MissingEntry`
//! - **Malformed JSON**: `Error::Decode`

use std::io;

/// Failure to fetch one document from a source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source has no document under this key.
    #[error("{key} not found")]
    NotFound { key: String },

    #[error("fetching {key}: {source}")]
    Http {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {key}: HTTP status {status}")]
    Status { key: String, status: u16 },

    #[error("reading {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }
}

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No entry in the database has the alias.
    #[error("no vulnerability with alias {alias}")]
    AliasNotFound { alias: String },

    /// A fetch failed for a reason other than absence, or a document the
    /// operation cannot do without was absent.
    #[error("{op}: {source}")]
    Source {
        op: String,
        #[source]
        source: SourceError,
    },

    /// An index names an entry that the database does not serve.
    #[error("vulnerability {id} was found in {index} but could not be retrieved")]
    MissingEntry { id: String, index: &'static str },

    #[error("decoding {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "invalid vulnerability database source {src:?}: \
         expected an http(s):// or file:// URL or a directory"
    )]
    InvalidSource { src: String },
}

impl Error {
    /// Reports whether this error means "no such thing", as opposed to a
    /// failure to find out.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::AliasNotFound { .. })
    }

    pub(crate) fn fetch(op: impl Into<String>, source: SourceError) -> Self {
        Error::Source {
            op: op.into(),
            source,
        }
    }

    pub(crate) fn decode(key: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            key: key.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
