//! Resolution of a result name to its header and payload files

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::session::{BinarySession, PayloadMode};
use super::Header;
use crate::config::{Config, FilesConfig};
use crate::{GrafError, Result};

/// Files backing one result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSet {
    /// Header and payload in two files
    Split {
        /// Header file
        header: PathBuf,
        /// Payload file
        payload: PathBuf,
    },
    /// Header followed by payload in one file
    Combined {
        /// The single file
        path: PathBuf,
    },
}

impl FileSet {
    /// Resolve a path with any (or no) extension to existing files
    ///
    /// The split layout wins when both of its files exist, even when `path`
    /// names the combined file; otherwise the combined file is used.
    ///
    /// # Errors
    ///
    /// Returns `Open` naming the first missing file if neither layout exists
    pub fn resolve(path: &Path, files: &FilesConfig) -> Result<Self> {
        let header = path.with_extension(&files.header_extension);
        let payload = path.with_extension(&files.payload_extension);
        if header.is_file() && payload.is_file() {
            return Ok(Self::Split { header, payload });
        }

        let combined = path.with_extension(&files.combined_extension);
        if combined.is_file() {
            return Ok(Self::Combined { path: combined });
        }

        let missing = if header.is_file() { payload } else { header };
        Err(GrafError::Open {
            path: missing,
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
        })
    }

    /// File stem shared by the set
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        let path = match self {
            Self::Split { header, .. } => header,
            Self::Combined { path } => path,
        };
        path.file_stem().and_then(|stem| stem.to_str())
    }

    /// Decode the header and open a session over the payload
    ///
    /// # Errors
    ///
    /// Returns any decode error, or `Open` if a file cannot be opened
    pub fn open(&self, config: &Config) -> Result<(Arc<Header>, BinarySession)> {
        let encoding = config.text_encoding()?;
        match self {
            Self::Split { header, payload } => {
                let header = Arc::new(Header::decode(header, encoding, &config.limits)?);
                let session = BinarySession::open(payload, Arc::clone(&header), PayloadMode::Separate)?;
                Ok((header, session))
            }
            Self::Combined { path } => {
                BinarySession::decode_combined(path, encoding, &config.limits)
            }
        }
    }
}

/// Resolve `path`, decode its header and open its payload
///
/// # Errors
///
/// See [`FileSet::resolve`] and [`FileSet::open`]
pub fn open_file_set(path: &Path, config: &Config) -> Result<(Arc<Header>, BinarySession)> {
    let files = FileSet::resolve(path, &config.files)?;
    debug!("Resolved {} to {:?}", path.display(), files);
    files.open(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_split_from_any_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("coster.hdr"), b"").unwrap();
        fs::write(dir.path().join("coster.bin"), b"").unwrap();
        let files = FilesConfig::default();

        let expected = FileSet::Split {
            header: dir.path().join("coster.hdr"),
            payload: dir.path().join("coster.bin"),
        };
        for given in ["coster", "coster.hdr", "coster.bin"] {
            let resolved = FileSet::resolve(&dir.path().join(given), &files).unwrap();
            assert_eq!(resolved, expected);
        }
        assert_eq!(expected.name(), Some("coster"));
    }

    #[test]
    fn test_resolve_combined() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("inflow_w.dat"), b"").unwrap();
        let files = FilesConfig::default();

        let resolved = FileSet::resolve(&dir.path().join("inflow_w"), &files).unwrap();
        assert_eq!(
            resolved,
            FileSet::Combined {
                path: dir.path().join("inflow_w.dat")
            }
        );
        let resolved = FileSet::resolve(&dir.path().join("inflow_w.dat"), &files).unwrap();
        assert!(matches!(resolved, FileSet::Combined { .. }));
    }

    #[test]
    fn test_resolve_prefers_split_over_combined() {
        let dir = TempDir::new().unwrap();
        for name in ["gerhid.hdr", "gerhid.bin", "gerhid.dat"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let files = FilesConfig::default();

        for given in ["gerhid", "gerhid.dat"] {
            let resolved = FileSet::resolve(&dir.path().join(given), &files).unwrap();
            assert_eq!(
                resolved,
                FileSet::Split {
                    header: dir.path().join("gerhid.hdr"),
                    payload: dir.path().join("gerhid.bin"),
                }
            );
        }

        fs::remove_file(dir.path().join("gerhid.bin")).unwrap();
        let resolved = FileSet::resolve(&dir.path().join("gerhid.dat"), &files).unwrap();
        assert_eq!(
            resolved,
            FileSet::Combined {
                path: dir.path().join("gerhid.dat")
            }
        );
    }

    #[test]
    fn test_resolve_missing_payload() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("demand.hdr"), b"").unwrap();

        let err = FileSet::resolve(&dir.path().join("demand"), &FilesConfig::default()).unwrap_err();
        match err {
            GrafError::Open { path, source } => {
                assert_eq!(path, dir.path().join("demand.bin"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
