//! Guarded artifact writes.

use camino::Utf8Path;

use crate::error::CodegenError;
use crate::guard::SelfEditGuard;
use crate::render::Rendered;

/// What [`commit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The document was written.
    Written,
    /// The document matched the last write; nothing was touched.
    Skipped,
}

/// Writes `document` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`CodegenError::CreateDir`] or [`CodegenError::Write`].
pub async fn write_artifact(path: &Utf8Path, document: &str) -> Result<(), CodegenError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| CodegenError::CreateDir {
                path: parent.to_owned(),
                source,
            })?;
    }
    tokio::fs::write(path, document)
        .await
        .map_err(|source| CodegenError::Write {
            path: path.to_owned(),
            source,
        })
}

/// Writes `rendered` to the guard's output path if the guard allows it.
///
/// On success the guard records the new fingerprint. On failure the guard is
/// left unchanged so a later pass retries.
///
/// # Errors
///
/// Propagates [`write_artifact`] errors.
pub async fn commit(guard: &mut SelfEditGuard, rendered: &Rendered) -> Result<WriteOutcome, CodegenError> {
    if !guard.should_write(&rendered.fingerprint) {
        tracing::debug!(fingerprint = rendered.fingerprint.short(), "Artifact unchanged, skipping write");
        return Ok(WriteOutcome::Skipped);
    }

    write_artifact(guard.output_path(), &rendered.document).await?;
    guard.record_write(rendered.fingerprint.clone());
    tracing::debug!(
        path = %guard.output_path(),
        fingerprint = rendered.fingerprint.short(),
        "Wrote artifact"
    );
    Ok(WriteOutcome::Written)
}
