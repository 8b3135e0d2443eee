use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use super::{entry_key, Source, MODULES_ENDPOINT, VULNS_ENDPOINT};
use crate::error::SourceError;
use crate::model::{Entry, ModuleMeta, ModuleVuln, Range, RangeType, VulnMeta};
use crate::range::parse_semver;

/// Serves a database held in memory, with indexes derived from its entries.
///
/// # Example
///
/// ```
/// use govulndb::model::Entry;
/// use govulndb::source::InMemorySource;
///
/// let source = InMemorySource::from_entries(&[Entry::new("GO-1999-0001")]).unwrap();
/// assert_eq!(source.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: HashMap<String, Vec<u8>>,
}

impl InMemorySource {
    /// Builds the module index, the ID index and one document per entry.
    pub fn from_entries(entries: &[Entry]) -> serde_json::Result<Self> {
        let mut documents = HashMap::new();
        let mut modules: BTreeMap<&str, Vec<ModuleVuln>> = BTreeMap::new();
        let mut vulns = Vec::with_capacity(entries.len());

        for entry in entries {
            for affected in &entry.affected {
                let fixed = latest_fixed(&affected.ranges);
                let module_vulns = modules.entry(affected.module.path.as_str()).or_default();
                match module_vulns.iter_mut().find(|v| v.id == entry.id) {
                    // An unfixed group keeps the whole module unfixed.
                    Some(existing) if existing.fixed.is_empty() || fixed.is_empty() => {
                        existing.fixed.clear()
                    }
                    Some(existing) => existing.fixed = max_fixed(&existing.fixed, &fixed),
                    None => module_vulns.push(ModuleVuln {
                        id: entry.id.clone(),
                        modified: entry.modified,
                        fixed,
                    }),
                }
            }

            vulns.push(VulnMeta {
                id: entry.id.clone(),
                modified: entry.modified,
                aliases: entry.aliases.clone(),
            });
            documents.insert(entry_key(&entry.id), serde_json::to_vec(entry)?);
        }

        let modules: Vec<ModuleMeta> = modules
            .into_iter()
            .map(|(path, vulns)| ModuleMeta {
                path: path.to_string(),
                vulns,
            })
            .collect();

        documents.insert(MODULES_ENDPOINT.to_string(), serde_json::to_vec(&modules)?);
        documents.insert(VULNS_ENDPOINT.to_string(), serde_json::to_vec(&vulns)?);

        Ok(Self { documents })
    }

    /// Stores a raw document, replacing any previous one under `key`.
    pub fn insert(&mut self, key: impl Into<String>, document: impl Into<Vec<u8>>) {
        self.documents.insert(key.into(), document.into());
    }

    /// Removes a document, returning it if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.documents.remove(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl Source for InMemorySource {
    async fn get(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        self.documents
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                key: key.to_string(),
            })
    }
}

/// Returns the highest fixed version across the semver ranges, or an empty
/// string if any of them is still open.
fn latest_fixed(ranges: &[Range]) -> String {
    let mut latest = String::new();
    for range in ranges.iter().filter(|r| r.range_type == RangeType::Semver) {
        let mut open = false;
        for event in &range.events {
            if !event.introduced.is_empty() {
                open = true;
            }
            if !event.fixed.is_empty() {
                open = false;
                latest = max_fixed(&latest, &event.fixed);
            }
        }
        if open {
            return String::new();
        }
    }
    latest
}

fn max_fixed(a: &str, b: &str) -> String {
    if a.is_empty() {
        return b.to_string();
    }
    if b.is_empty() {
        return a.to_string();
    }
    match (parse_semver(a), parse_semver(b)) {
        (Some(va), Some(vb)) if vb > va => b.to_string(),
        (None, Some(_)) => b.to_string(),
        _ => a.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Affected, RangeEvent};

    #[test]
    fn test_latest_fixed() {
        assert_eq!(latest_fixed(&[]), "");
        assert_eq!(
            latest_fixed(&[Range::semver(vec![
                RangeEvent::introduced("0"),
                RangeEvent::fixed("1.2.0"),
                RangeEvent::introduced("1.3.0"),
                RangeEvent::fixed("1.3.4"),
            ])]),
            "1.3.4"
        );
        assert_eq!(
            latest_fixed(&[
                Range::semver(vec![RangeEvent::fixed("1.2.0")]),
                Range::semver(vec![RangeEvent::introduced("2.0.0")]),
            ]),
            ""
        );
        assert_eq!(
            latest_fixed(&[Range::semver(vec![
                RangeEvent::fixed("1.10.0"),
                RangeEvent::fixed("1.9.0"),
            ])]),
            "1.10.0"
        );
    }

    #[tokio::test]
    async fn test_indexes() {
        let entry = Entry {
            aliases: vec!["CVE-1999-0001".to_string()],
            affected: vec![
                Affected::new("b.com").with_range(Range::semver(vec![RangeEvent::fixed("1.0.0")])),
                Affected::new("a.com").with_range(Range::semver(vec![RangeEvent::introduced("0")])),
                Affected::new("b.com").with_range(Range::semver(vec![RangeEvent::fixed("1.1.0")])),
            ],
            ..Entry::new("GO-1999-0001")
        };
        let source = InMemorySource::from_entries(&[entry]).unwrap();

        let modules: Vec<ModuleMeta> =
            serde_json::from_slice(&source.get(MODULES_ENDPOINT).await.unwrap()).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].path, "a.com");
        assert_eq!(modules[0].vulns[0].fixed, "");
        assert_eq!(modules[1].path, "b.com");
        assert_eq!(modules[1].vulns.len(), 1);
        assert_eq!(modules[1].vulns[0].fixed, "1.1.0");

        let vulns: Vec<VulnMeta> =
            serde_json::from_slice(&source.get(VULNS_ENDPOINT).await.unwrap()).unwrap();
        assert_eq!(vulns[0].aliases, vec!["CVE-1999-0001"]);

        let err = source.get("ID/GO-1999-0002.json").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
