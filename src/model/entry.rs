use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A full OSV vulnerability record as published under `ID/<id>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawn: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub affected: Vec<Affected>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_specific: Option<DatabaseSpecific>,
}

impl Entry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Returns the first line of the summary, falling back to the details.
    pub fn title(&self) -> &str {
        self.summary
            .as_deref()
            .or(self.details.as_deref())
            .and_then(|s| s.lines().next())
            .unwrap_or("")
    }
}

/// One affected module of an [`Entry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affected {
    #[serde(rename = "package")]
    pub module: Module,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<Range>,
    #[serde(default)]
    pub ecosystem_specific: EcosystemSpecific,
}

impl Affected {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            module: Module {
                path: path.into(),
                ecosystem: Module::GO_ECOSYSTEM.to_string(),
            },
            ..Self::default()
        }
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.ecosystem_specific.packages.push(package);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    #[serde(rename = "name")]
    pub path: String,
    #[serde(default)]
    pub ecosystem: String,
}

impl Module {
    pub const GO_ECOSYSTEM: &'static str = "Go";
}

/// The kind of versions a [`Range`] is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeType {
    #[default]
    Semver,
    Ecosystem,
    Git,
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    #[serde(rename = "type")]
    pub range_type: RangeType,
    #[serde(default)]
    pub events: Vec<RangeEvent>,
}

impl Range {
    pub fn semver(events: Vec<RangeEvent>) -> Self {
        Self {
            range_type: RangeType::Semver,
            events,
        }
    }
}

/// A point where a range of affected versions opens or closes.
///
/// Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEvent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub introduced: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fixed: String,
}

impl RangeEvent {
    pub fn introduced(version: impl Into<String>) -> Self {
        Self {
            introduced: version.into(),
            ..Self::default()
        }
    }

    pub fn fixed(version: impl Into<String>) -> Self {
        Self {
            fixed: version.into(),
            ..Self::default()
        }
    }

    pub fn between(introduced: impl Into<String>, fixed: impl Into<String>) -> Self {
        Self {
            introduced: introduced.into(),
            fixed: fixed.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemSpecific {
    #[serde(default, rename = "imports", skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
}

/// An affected package (import path) and, when known, its vulnerable symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goos: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goarch: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,
}

impl Package {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    pub reference_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSpecific {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_go_osv_record() {
        let json = r#"{
            "id": "GO-2022-0969",
            "modified": "2023-04-03T15:57:51Z",
            "published": "2022-09-12T20:23:06Z",
            "aliases": ["CVE-2022-27664", "GHSA-69cg-p879-7622"],
            "summary": "Denial of service in net/http and golang.org/x/net/http2",
            "details": "HTTP/2 server connections can hang forever.",
            "affected": [{
                "package": {"name": "stdlib", "ecosystem": "Go"},
                "ranges": [{"type": "SEMVER", "events": [
                    {"introduced": "0"}, {"fixed": "1.18.6"},
                    {"introduced": "1.19.0"}, {"fixed": "1.19.1"}
                ]}],
                "ecosystem_specific": {"imports": [{
                    "path": "net/http",
                    "symbols": ["ListenAndServe", "Server.Serve"]
                }]}
            }],
            "references": [{"type": "WEB", "url": "https://groups.google.com/g/golang-announce"}],
            "database_specific": {"url": "https://pkg.go.dev/vuln/GO-2022-0969"}
        }"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "GO-2022-0969");
        assert_eq!(entry.aliases.len(), 2);
        assert_eq!(entry.affected[0].module.path, "stdlib");
        assert_eq!(entry.affected[0].ranges[0].range_type, RangeType::Semver);
        assert_eq!(entry.affected[0].ranges[0].events[1].fixed, "1.18.6");
        assert_eq!(
            entry.affected[0].ecosystem_specific.packages[0].symbols,
            vec!["ListenAndServe", "Server.Serve"]
        );
        assert_eq!(
            entry.database_specific.unwrap().url,
            "https://pkg.go.dev/vuln/GO-2022-0969"
        );
    }

    #[test]
    fn test_unknown_range_type() {
        let range: Range = serde_json::from_str(r#"{"type": "SOMETHING_ELSE"}"#).unwrap();
        assert_eq!(range.range_type, RangeType::Unspecified);
        assert!(range.events.is_empty());
    }

    #[test]
    fn test_title() {
        let mut entry = Entry::new("GO-1999-0001");
        assert_eq!(entry.title(), "");

        entry.details = Some("first line\nsecond line".to_string());
        assert_eq!(entry.title(), "first line");

        entry.summary = Some("Summary".to_string());
        assert_eq!(entry.title(), "Summary");
    }
}
