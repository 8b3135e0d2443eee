//! Where vulnerability database documents come from.
//!
//! A database is a set of JSON documents addressed by key:
//!
//! | Key | Contents |
//! |-----|----------|
//! | `index/modules.json` | every module and the vulnerabilities recorded against it |
//! | `index/vulns.json` | every vulnerability ID and its aliases |
//! | `ID/<id>.json` | the full OSV record for one ID |
//!
//! The [`Source`] trait fetches those documents; [`HttpSource`],
//! [`DirSource`] and [`InMemorySource`] serve them from a web server, a local
//! copy of the database and memory respectively.

mod file;
mod http;
mod memory;

pub use file::DirSource;
pub use http::HttpSource;
pub use memory::InMemorySource;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result, SourceError};

/// Key of the module index.
pub const MODULES_ENDPOINT: &str = "index/modules.json";

/// Key of the vulnerability ID index.
pub const VULNS_ENDPOINT: &str = "index/vulns.json";

/// Directory holding one document per vulnerability ID.
pub const ID_DIR: &str = "ID";

/// Returns the key of the full record for `id`.
pub fn entry_key(id: &str) -> String {
    format!("{ID_DIR}/{id}.json")
}

/// Reports whether `id` can name a record: it is not empty and holds no path
/// separator or `..`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && !id.contains("..")
}

/// Fetches raw documents of a vulnerability database.
///
/// Implementations must report a missing document as
/// [`SourceError::NotFound`] so callers can tell absence apart from failure.
/// Dropping the returned future must abandon the fetch.
#[async_trait]
pub trait Source: Send + Sync {
    /// Returns the document stored under `key`.
    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, SourceError>;
}

#[async_trait]
impl<S: Source + ?Sized> Source for Arc<S> {
    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, SourceError> {
        (**self).get(key).await
    }
}

/// Creates a source from a URL or path.
///
/// `http://` and `https://` URLs are served over HTTP with the given request
/// timeout; `file://` URLs and plain paths to existing directories are read
/// from disk.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use govulndb::source::new_source;
///
/// assert!(new_source("https://vuln.go.dev", Duration::from_secs(30)).is_ok());
/// assert!(new_source("ftp://example.com", Duration::from_secs(30)).is_err());
/// ```
pub fn new_source(src: &str, timeout: Duration) -> Result<Arc<dyn Source>> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return Ok(Arc::new(HttpSource::new(src, timeout)?));
    }

    let path = src.strip_prefix("file://").unwrap_or(src);
    if !path.is_empty() && Path::new(path).is_dir() {
        return Ok(Arc::new(DirSource::new(path)));
    }

    Err(Error::InvalidSource {
        src: src.to_string(),
    })
}
