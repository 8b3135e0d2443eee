//! Core data types for vulnerability records and database indexes.
//!
//! This module contains the types decoded from a Go vulnerability database:
//!
//! - [`Entry`] - A full OSV record (`ID/<id>.json`)
//! - [`Affected`] - One affected module, its ranges and packages
//! - [`ModuleMeta`] - An element of the module index (`index/modules.json`)
//! - [`VulnMeta`] - An element of the ID index (`index/vulns.json`)
//! - [`PackageRequest`] - A lookup by module, package and version
//!
//! # Example
//!
//! ```
//! use govulndb::model::Entry;
//!
//! let entry: Entry = serde_json::from_str(r#"{"id": "GO-2022-0001"}"#).unwrap();
//! assert_eq!(entry.id, "GO-2022-0001");
//! assert!(entry.affected.is_empty());
//! ```

mod entry;
mod index;
mod request;

pub use entry::*;
pub use index::*;
pub use request::*;

/// Module path used by the database for the Go standard library.
pub const STDLIB_MODULE_PATH: &str = "stdlib";

/// Module path callers use for the standard library (as in `go list -m`).
pub const GO_STD_MODULE_PATH: &str = "std";

/// Module path under which the database records the Go toolchain.
pub const TOOLCHAIN_MODULE_PATH: &str = "toolchain";
