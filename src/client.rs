//! Reading a vulnerability database.
//!
//! [`Client`] answers lookups by module, ID and alias. Lookups by module use
//! the module index to pick the records worth fetching, fetch them in
//! parallel with a bounded number of requests in flight, and keep the ones
//! that really affect the requested version and package.
//!
//! # Example
//!
//! ```
//! use govulndb::model::{Affected, Entry, PackageRequest, Range, RangeEvent};
//! use govulndb::Client;
//!
//! #[tokio::main]
//! async fn main() -> govulndb::Result<()> {
//!     let entry = Entry {
//!         affected: vec![Affected::new("example.com/mod")
//!             .with_range(Range::semver(vec![RangeEvent::fixed("1.2.0")]))],
//!         ..Entry::new("GO-2023-0001")
//!     };
//!     let client = Client::in_memory(&[entry])?;
//!
//!     let req = PackageRequest::new("example.com/mod").with_version("v1.1.0");
//!     let entries = client.by_package(&req).await?;
//!     assert_eq!(entries[0].id, "GO-2023-0001");
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Affected, Entry, ModuleMeta, PackageRequest, VulnMeta};
use crate::range::{affects, is_before_fix, VersionScheme};
use crate::source::{
    entry_key, is_valid_id, new_source, InMemorySource, Source, MODULES_ENDPOINT, VULNS_ENDPOINT,
};
use crate::stream::for_each_element;

/// Default number of records fetched at once by [`Client::by_package`].
pub const DEFAULT_BY_PACKAGE_CONCURRENCY: usize = 10;

/// Default number of records fetched at once by [`Client::entries`].
pub const DEFAULT_ENTRIES_CONCURRENCY: usize = 4;

/// Default timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tuning for a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Records fetched at once by [`Client::by_package`].
    pub by_package_concurrency: usize,
    /// Records fetched at once by [`Client::entries`].
    pub entries_concurrency: usize,
    /// Timeout for a single request, for sources that make requests.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            by_package_concurrency: DEFAULT_BY_PACKAGE_CONCURRENCY,
            entries_concurrency: DEFAULT_ENTRIES_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Reads a Go vulnerability database.
///
/// Cloning is cheap and clones share the source. Every call works on its
/// own state, so a client can serve concurrent calls.
#[derive(Clone)]
pub struct Client {
    source: Arc<dyn Source>,
    config: ClientConfig,
}

impl Client {
    /// Creates a client for the database at `src`, an `http(s)://` URL, a
    /// `file://` URL or a directory.
    pub fn new(src: &str, config: ClientConfig) -> Result<Self> {
        let source = new_source(src, config.request_timeout)?;
        Ok(Self::from_arc(source, config))
    }

    /// Creates a client reading from `source`.
    pub fn with_source(source: impl Source + 'static, config: ClientConfig) -> Self {
        Self::from_arc(Arc::new(source), config)
    }

    /// Creates a client serving `entries` from memory, with default tuning.
    pub fn in_memory(entries: &[Entry]) -> Result<Self> {
        let source = InMemorySource::from_entries(entries)
            .map_err(|e| Error::decode("in-memory database", e))?;
        Ok(Self::with_source(source, ClientConfig::default()))
    }

    fn from_arc(source: Arc<dyn Source>, config: ClientConfig) -> Self {
        let config = ClientConfig {
            by_package_concurrency: config.by_package_concurrency.max(1),
            entries_concurrency: config.entries_concurrency.max(1),
            ..config
        };
        Self { source, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the entries affecting the requested module, and if set, the
    /// requested package and version, sorted by ID.
    ///
    /// An empty module yields no entries. A record named by the module index
    /// that cannot be retrieved is an error, and so is any failed fetch; no
    /// partial result is returned.
    pub async fn by_package(&self, req: &PackageRequest) -> Result<Vec<Entry>> {
        if req.module.is_empty() {
            return Ok(Vec::new());
        }

        let op = format!("by_package({req})");
        let scheme = VersionScheme::for_module(&req.module);
        let ids = self.candidate_ids(&op, req, scheme).await?;
        if ids.is_empty() {
            debug!(request = %req, "no candidate vulnerabilities");
            return Ok(Vec::new());
        }
        debug!(request = %req, candidates = ids.len(), "fetching candidate entries");

        let mut entries: Vec<Entry> = stream::iter(ids)
            .map(|id| async move {
                let entry = self.by_id(&id).await?;
                entry.ok_or(Error::MissingEntry {
                    id,
                    index: MODULES_ENDPOINT,
                })
            })
            .buffer_unordered(self.config.by_package_concurrency)
            .try_filter(|entry| future::ready(is_affected(entry, req, scheme)))
            .try_collect()
            .await?;

        entries.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(request = %req, matches = entries.len(), "matched entries");
        Ok(entries)
    }

    /// Scans the module index for the requested module and returns the IDs
    /// that may affect the requested version.
    async fn candidate_ids(
        &self,
        op: &str,
        req: &PackageRequest,
        scheme: VersionScheme,
    ) -> Result<Vec<String>> {
        let index = self.fetch(op, MODULES_ENDPOINT).await?;

        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        for_each_element(&index, |module: ModuleMeta| {
            if module.path != req.module {
                return ControlFlow::Continue(());
            }
            for vuln in module.vulns {
                // A record is only worth fetching if the version may not be
                // past the highest fix.
                if is_before_fix(&req.version, &vuln.fixed, scheme)
                    && seen.insert(vuln.id.clone())
                {
                    ids.push(vuln.id);
                }
            }
            ControlFlow::Break(())
        })
        .map_err(|e| Error::decode(MODULES_ENDPOINT, e))?;

        Ok(ids)
    }

    /// Returns the entry with the given ID, or `None` if the database has no
    /// such entry. An ID that could not name a record, such as one holding a
    /// path separator, is never looked up.
    pub async fn by_id(&self, id: &str) -> Result<Option<Entry>> {
        if !is_valid_id(id) {
            debug!(id, "rejecting malformed vulnerability ID");
            return Ok(None);
        }
        let key = entry_key(id);
        let bytes = match self.source.get(&key).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(Error::fetch(format!("by_id({id})"), e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::decode(key, e))
    }

    /// Returns the ID of the first entry having `alias`, or
    /// [`Error::AliasNotFound`] if there is none.
    pub async fn by_alias(&self, alias: &str) -> Result<String> {
        let op = format!("by_alias({alias})");
        let index = self.fetch(&op, VULNS_ENDPOINT).await?;

        let mut found = None;
        for_each_element(&index, |vuln: VulnMeta| {
            if vuln.aliases.iter().any(|a| a == alias) {
                found = Some(vuln.id);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .map_err(|e| Error::decode(VULNS_ENDPOINT, e))?;

        found.ok_or_else(|| Error::AliasNotFound {
            alias: alias.to_string(),
        })
    }

    /// Returns every entry in the database, in index order.
    pub async fn entries(&self) -> Result<Vec<Entry>> {
        let ids = self.ids().await?;
        debug!(count = ids.len(), "fetching all entries");

        stream::iter(ids)
            .map(|id| async move {
                let entry = self.by_id(&id).await?;
                entry.ok_or(Error::MissingEntry {
                    id,
                    index: VULNS_ENDPOINT,
                })
            })
            .buffered(self.config.entries_concurrency)
            .try_collect()
            .await
    }

    /// Returns the IDs of every entry in the database, in index order.
    pub async fn ids(&self) -> Result<Vec<String>> {
        let index = self.fetch("ids", VULNS_ENDPOINT).await?;

        let mut ids = Vec::new();
        for_each_element(&index, |vuln: VulnMeta| {
            ids.push(vuln.id);
            ControlFlow::Continue(())
        })
        .map_err(|e| Error::decode(VULNS_ENDPOINT, e))?;

        Ok(ids)
    }

    /// Fetches a document the operation cannot do without; absence is an
    /// error.
    async fn fetch(&self, op: &str, key: &str) -> Result<Vec<u8>> {
        self.source.get(key).await.map_err(|e| Error::fetch(op, e))
    }
}

fn is_affected(entry: &Entry, req: &PackageRequest, scheme: VersionScheme) -> bool {
    entry.affected.iter().any(|affected| {
        affected.module.path == req.module
            && affects(&affected.ranges, &req.version, scheme)
            && package_matches(affected, &req.package)
    })
}

/// A module without package information matches any package.
fn package_matches(affected: &Affected, package: &str) -> bool {
    let packages = &affected.ecosystem_specific.packages;
    package.is_empty() || packages.is_empty() || packages.iter().any(|p| p.path == package)
}
