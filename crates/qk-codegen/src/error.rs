//! Error types for the qk-codegen crate.

use camino::Utf8PathBuf;

/// Errors that can occur while writing the generated artifact.
///
/// A failed write leaves the write guard untouched, so the next pass retries.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The artifact path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    /// Returns the path involved in the failure.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::CreateDir { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_display() {
        let err = CodegenError::Write {
            path: Utf8PathBuf::from("out/keys.d.ts"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write out/keys.d.ts: denied");
        assert_eq!(err.path(), "out/keys.d.ts");
    }
}
