//! Describing what a vulnerability affects.
//!
//! [`affected_components`] condenses a record into the modules and packages
//! it affects, with a readable version range for modules and the affected
//! symbols of packages split into exported and unexported ones.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Affected, Entry};
use crate::range::collect_range_pairs;

/// A module or package affected by a vulnerability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AffectedComponent {
    pub path: String,
    /// Affected versions, e.g. `from v1.5.0 before v1.10.0, before v2.3.0`.
    /// Only set on module components.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub versions: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exported_symbols: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unexported_symbols: Vec<String>,
}

/// Returns the packages and the modules affected by `entry`.
///
/// Every listed package becomes a package component. A module that lists no
/// packages becomes a module component instead, since nothing finer is known.
/// Both lists keep the order of the record.
pub fn affected_components(entry: &Entry) -> (Vec<AffectedComponent>, Vec<AffectedComponent>) {
    let mut packages = Vec::new();
    let mut modules = Vec::new();

    for affected in &entry.affected {
        let listed = &affected.ecosystem_specific.packages;
        if listed.is_empty() {
            modules.push(AffectedComponent {
                path: affected.module.path.clone(),
                versions: versions_string(affected),
                ..AffectedComponent::default()
            });
            continue;
        }

        for package in listed {
            let (exported, unexported) = split_symbols(&package.symbols);
            packages.push(AffectedComponent {
                path: package.path.clone(),
                versions: String::new(),
                exported_symbols: exported,
                unexported_symbols: unexported,
            });
        }
    }

    (packages, modules)
}

/// Renders the affected ranges of a module as text.
pub fn versions_string(affected: &Affected) -> String {
    collect_range_pairs(affected)
        .into_iter()
        .filter_map(|pair| match (pair.introduced.is_empty(), pair.fixed.is_empty()) {
            (false, false) => Some(format!("from {} before {}", pair.introduced, pair.fixed)),
            (true, false) => Some(format!("before {}", pair.fixed)),
            (_, true) => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Splits symbols into exported and unexported ones. A method is exported
/// only if both its type and its name are.
fn split_symbols(symbols: &[String]) -> (Vec<String>, Vec<String>) {
    let (exported, unexported): (Vec<String>, Vec<String>) =
        symbols.iter().cloned().partition(|s| is_exported(s));
    (dedup_sorted(exported), dedup_sorted(unexported))
}

fn is_exported(symbol: &str) -> bool {
    symbol
        .split('.')
        .all(|part| part.chars().next().is_some_and(char::is_uppercase))
}

/// Drops repeats and orders case-insensitively, breaking ties between names
/// that differ only in case byte-wise.
fn dedup_sorted(mut symbols: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols.retain(|s| seen.insert(s.clone()));
    symbols.sort_by_cached_key(|s| (s.to_lowercase(), s.clone()));
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Package, Range, RangeEvent};

    fn component(path: &str, exported: &[&str], unexported: &[&str]) -> AffectedComponent {
        AffectedComponent {
            path: path.to_string(),
            versions: String::new(),
            exported_symbols: exported.iter().map(|s| s.to_string()).collect(),
            unexported_symbols: unexported.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn module_versions(events: Vec<RangeEvent>) -> String {
        let entry = Entry {
            affected: vec![Affected::new("example.com/p").with_range(Range::semver(events))],
            ..Entry::new("GO-2022-0000")
        };
        let (_, modules) = affected_components(&entry);
        modules[0].versions.clone()
    }

    #[test]
    fn test_versions() {
        assert_eq!(module_versions(vec![]), "");
        assert_eq!(module_versions(vec![RangeEvent::fixed("1.5")]), "before v1.5");
        assert_eq!(
            module_versions(vec![RangeEvent::introduced("1.5"), RangeEvent::fixed("1.10")]),
            "from v1.5 before v1.10"
        );
        assert_eq!(
            module_versions(vec![
                RangeEvent::between("1.5", "1.10"),
                RangeEvent::fixed("2.3"),
            ]),
            "from v1.5 before v1.10, before v2.3"
        );
        assert_eq!(
            module_versions(vec![RangeEvent::introduced("0"), RangeEvent::fixed("1.2.3")]),
            "before v1.2.3"
        );
    }

    #[test]
    fn test_versions_keep_declaration_order() {
        let affected = Affected::new("example.com/p")
            .with_range(Range::semver(vec![RangeEvent::between("2.0.0", "2.0.4")]))
            .with_range(Range::semver(vec![RangeEvent::between("1.0.0", "1.0.9")]));
        assert_eq!(
            versions_string(&affected),
            "from v2.0.0 before v2.0.4, from v1.0.0 before v1.0.9"
        );
    }

    #[test]
    fn test_one_symbol() {
        let entry = Entry {
            affected: vec![Affected::new("example.com/mod")
                .with_package(Package::new("example.com/mod/pkg").with_symbols(["F"]))],
            ..Entry::new("GO-2022-0001")
        };
        let (packages, modules) = affected_components(&entry);
        assert_eq!(packages, vec![component("example.com/mod/pkg", &["F"], &[])]);
        assert!(modules.is_empty());
    }

    #[test]
    fn test_multiple_symbols() {
        let entry = Entry {
            affected: vec![Affected::new("example.com/mod").with_package(
                Package::new("example.com/mod/pkg")
                    .with_symbols(["F", "g", "S.f", "S.F", "s.F", "s.f"]),
            )],
            ..Entry::new("GO-2022-0002")
        };
        let (packages, _) = affected_components(&entry);
        assert_eq!(
            packages,
            vec![component(
                "example.com/mod/pkg",
                &["F", "S.F"],
                &["g", "S.f", "s.F", "s.f"]
            )]
        );
    }

    #[test]
    fn test_symbols_deduplicated_and_sorted() {
        let entry = Entry {
            affected: vec![Affected::new("example.com/mod").with_package(
                Package::new("example.com/mod/pkg").with_symbols(["Z", "b", "A", "Z", "a", "b"]),
            )],
            ..Entry::new("GO-2022-0005")
        };
        let (packages, _) = affected_components(&entry);
        assert_eq!(packages[0].exported_symbols, vec!["A", "Z"]);
        assert_eq!(packages[0].unexported_symbols, vec!["a", "b"]);
    }

    #[test]
    fn test_symbol_order_ignores_record_order() {
        let unexported = |symbols: [&str; 3]| {
            let entry = Entry {
                affected: vec![Affected::new("example.com/mod").with_package(
                    Package::new("example.com/mod/pkg").with_symbols(symbols),
                )],
                ..Entry::new("GO-2022-0007")
            };
            affected_components(&entry).0[0].unexported_symbols.clone()
        };

        assert_eq!(unexported(["S.f", "s.f", "s.F"]), vec!["S.f", "s.F", "s.f"]);
        assert_eq!(unexported(["s.f", "s.F", "S.f"]), vec!["S.f", "s.F", "s.f"]);
    }

    #[test]
    fn test_no_symbol() {
        let entry = Entry {
            affected: vec![
                Affected::new("example.com/mod").with_package(Package::new("example.com/mod/pkg"))
            ],
            ..Entry::new("GO-2022-0003")
        };
        let (packages, modules) = affected_components(&entry);
        assert_eq!(packages, vec![component("example.com/mod/pkg", &[], &[])]);
        assert!(modules.is_empty());
    }

    #[test]
    fn test_multiple_packages_and_modules() {
        let entry = Entry {
            affected: vec![
                Affected::new("example.com/mod")
                    .with_range(Range::semver(vec![RangeEvent::fixed("1.5")])),
                Affected::new("example.com/mod1")
                    .with_range(Range::semver(vec![RangeEvent::fixed("1.0.0")]))
                    .with_package(Package::new("example.com/mod1/pkg1"))
                    .with_package(Package::new("example.com/mod1/pkg2").with_symbols(["F"])),
                Affected::new("example.com/mod2").with_package(
                    Package::new("example.com/mod2/pkg3").with_symbols(["g", "H"]),
                ),
            ],
            ..Entry::new("GO-2022-0004")
        };

        let (packages, modules) = affected_components(&entry);
        assert_eq!(
            packages,
            vec![
                component("example.com/mod1/pkg1", &[], &[]),
                component("example.com/mod1/pkg2", &["F"], &[]),
                component("example.com/mod2/pkg3", &["H"], &["g"]),
            ]
        );
        assert_eq!(
            modules,
            vec![AffectedComponent {
                path: "example.com/mod".to_string(),
                versions: "before v1.5".to_string(),
                ..AffectedComponent::default()
            }]
        );
    }

    #[test]
    fn test_deriving_is_repeatable() {
        let entry = Entry {
            affected: vec![
                Affected::new("example.com/mod")
                    .with_range(Range::semver(vec![RangeEvent::between("1.0.0", "1.1.0")])),
                Affected::new("example.com/other").with_package(
                    Package::new("example.com/other/pkg").with_symbols(["T.M", "t.m", "T.M"]),
                ),
            ],
            ..Entry::new("GO-2022-0006")
        };
        assert_eq!(affected_components(&entry), affected_components(&entry));
    }
}
