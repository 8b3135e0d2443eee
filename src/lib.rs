//! A client for Go vulnerability databases.
//!
//! Given a module, optionally a package within it, and a version,
//! [`Client::by_package`] returns the OSV records that affect it. The
//! [`range`] module decides whether a version is inside a record's affected
//! ranges, and [`components`] describes what a record affects.

pub mod client;
pub mod components;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod range;
pub mod source;
mod stream;
pub mod vulns;

pub use client::{Client, ClientConfig};
pub use components::{affected_components, AffectedComponent};
pub use config::Config;
pub use error::{Error, Result, SourceError};
pub use model::{Entry, PackageRequest};
pub use source::Source;
pub use vulns::{vulns_for_package, Vuln};
