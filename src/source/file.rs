use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::Source;
use crate::error::SourceError;

/// Serves a copy of the database from a local directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Source for DirSource {
    async fn get(&self, key: &str) -> Result<Vec<u8>, SourceError> {
        // Keys never leave the database root.
        if key
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == ".." || part.contains('\\'))
        {
            return Err(SourceError::NotFound {
                key: key.to_string(),
            });
        }

        let path = key
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part));

        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                SourceError::NotFound {
                    key: key.to_string(),
                }
            } else {
                SourceError::Io {
                    key: key.to_string(),
                    source,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_reads_nested_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ID")).unwrap();
        fs::write(dir.path().join("ID").join("GO-1999-0001.json"), b"{}").unwrap();

        let source = DirSource::new(dir.path());
        assert_eq!(source.get("ID/GO-1999-0001.json").await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());

        let err = source.get("ID/GO-1999-0001.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("index")).unwrap();
        let source = DirSource::new(dir.path());

        let err = source.get("index").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_rejects_keys_leaving_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("db");
        fs::create_dir_all(root.join("ID")).unwrap();
        fs::write(dir.path().join("secret.json"), b"{}").unwrap();

        let source = DirSource::new(&root);
        for key in ["ID/../../secret.json", "../secret.json", "/secret.json", "ID//x.json"] {
            let err = source.get(key).await.unwrap_err();
            assert!(err.is_not_found(), "{key}");
        }
    }
}
