use std::fmt;

/// A query for the vulnerabilities affecting one module, optionally
/// narrowed to a package and a version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRequest {
    /// The module path to filter on. Lookups with an empty module always
    /// return no entries.
    pub module: String,
    /// The package path to filter on. Empty means "any package".
    pub package: String,
    /// The module version to filter on. Empty means "any version".
    pub version: String,
}

impl PackageRequest {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl fmt::Display for PackageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.module)?;
        if !self.package.is_empty() {
            write!(f, " package={}", self.package)?;
        }
        if !self.version.is_empty() {
            write!(f, "@{}", self.version)?;
        }
        Ok(())
    }
}
