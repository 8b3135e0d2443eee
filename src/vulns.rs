//! Vulnerability summaries for a package page.

use serde::Serialize;
use tracing::warn;

use crate::client::Client;
use crate::error::Result;
use crate::model::{Entry, PackageRequest, GO_STD_MODULE_PATH, STDLIB_MODULE_PATH};

/// A vulnerability affecting a package, as shown next to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vuln {
    pub id: String,
    pub details: String,
}

impl From<Entry> for Vuln {
    fn from(entry: Entry) -> Self {
        Self {
            details: entry.details.unwrap_or_default(),
            id: entry.id,
        }
    }
}

/// Returns the vulnerabilities affecting `package` of `module` at `version`.
///
/// `std` is accepted for the standard library. Lookup failures are logged
/// and yield no vulnerabilities, so a database outage never breaks the
/// caller.
pub async fn vulns_for_package(
    client: &Client,
    module: &str,
    version: &str,
    package: &str,
) -> Vec<Vuln> {
    match try_vulns_for_package(client, module, version, package).await {
        Ok(vulns) => vulns,
        Err(err) => {
            warn!(module, version, package, error = %err, "vulnerability lookup failed");
            Vec::new()
        }
    }
}

async fn try_vulns_for_package(
    client: &Client,
    module: &str,
    version: &str,
    package: &str,
) -> Result<Vec<Vuln>> {
    let module = if module == GO_STD_MODULE_PATH {
        STDLIB_MODULE_PATH
    } else {
        module
    };
    let req = PackageRequest::new(module)
        .with_package(package)
        .with_version(version);

    let entries = client.by_package(&req).await?;
    Ok(entries.into_iter().map(Vuln::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::error::SourceError;
    use crate::model::{Affected, Package, Range, RangeEvent};
    use crate::source::Source;
    use async_trait::async_trait;

    fn client() -> Client {
        let entries = vec![
            Entry {
                details: Some("bad things".to_string()),
                affected: vec![Affected::new("bad.com")
                    .with_range(Range::semver(vec![
                        RangeEvent::introduced("0"),
                        RangeEvent::fixed("1.2.3"),
                    ]))
                    .with_package(Package::new("bad.com"))],
                ..Entry::new("GO-1999-0001")
            },
            Entry {
                affected: vec![Affected::new("stdlib")
                    .with_range(Range::semver(vec![
                        RangeEvent::introduced("0"),
                        RangeEvent::fixed("1.19.4"),
                    ]))
                    .with_package(Package::new("net/http"))],
                ..Entry::new("GO-2000-0003")
            },
        ];
        Client::in_memory(&entries).unwrap()
    }

    fn vuln(id: &str, details: &str) -> Vuln {
        Vuln {
            id: id.to_string(),
            details: details.to_string(),
        }
    }

    #[tokio::test]
    async fn test_vulns_for_package() {
        let client = client();

        assert_eq!(
            vulns_for_package(&client, "bad.com", "v1.0.0", "bad.com").await,
            vec![vuln("GO-1999-0001", "bad things")]
        );
        assert!(vulns_for_package(&client, "bad.com", "v1.3.0", "bad.com")
            .await
            .is_empty());
        assert!(vulns_for_package(&client, "good.com", "v1.0.0", "good.com")
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_vulns_for_stdlib() {
        let client = client();

        assert_eq!(
            vulns_for_package(&client, "std", "go1.19.3", "net/http").await,
            vec![vuln("GO-2000-0003", "")]
        );
        assert!(vulns_for_package(&client, "std", "go1.20", "net/http")
            .await
            .is_empty());
        assert!(vulns_for_package(
            &client,
            "std",
            "v0.0.0-20230104211531-bae7d772e800",
            "net/http"
        )
        .await
        .is_empty());
    }

    struct Unavailable;

    #[async_trait]
    impl Source for Unavailable {
        async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, SourceError> {
            Err(SourceError::Status {
                key: key.to_string(),
                status: 503,
            })
        }
    }

    #[tokio::test]
    async fn test_failures_yield_nothing() {
        let client = Client::with_source(Unavailable, ClientConfig::default());
        assert!(vulns_for_package(&client, "bad.com", "v1.0.0", "bad.com")
            .await
            .is_empty());
    }
}
