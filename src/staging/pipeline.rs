//! Artifact transfers and the guaranteed cleanup step.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, error, info};

use crate::client::{ClientError, Location, ObjectStore};

use super::{remote_uri, RelPath, StagingSpec};

/// Transfer errors
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("upload of {artifact} failed: {source}")]
    Upload {
        artifact: String,
        #[source]
        source: ClientError,
    },

    #[error("download of {artifact} failed: {source}")]
    Download {
        artifact: String,
        #[source]
        source: ClientError,
    },

    #[error("teardown of {prefix} failed: {source}")]
    Teardown {
        prefix: String,
        #[source]
        source: ClientError,
    },
}

/// Moves artifacts between a local root and a remote prefix
///
/// Transfers run one at a time in list order. The first failure stops the
/// batch; artifacts already moved stay where they are.
pub struct StagingPipeline<'a> {
    store: &'a dyn ObjectStore,
    local_root: PathBuf,
}

impl<'a> StagingPipeline<'a> {
    pub fn new(store: &'a dyn ObjectStore, local_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            local_root: local_root.into(),
        }
    }

    fn local_path(&self, artifact: &RelPath) -> PathBuf {
        self.local_root.join(artifact.as_str())
    }

    pub fn upload(&self, prefix: &str, artifacts: &[RelPath]) -> Result<(), TransferError> {
        for artifact in artifacts {
            let local = self.local_path(artifact);
            log_digest("upload", &local);
            let out = self
                .store
                .copy(
                    &Location::Local(local),
                    &Location::Remote(remote_uri(prefix, artifact)),
                )
                .map_err(|source| TransferError::Upload {
                    artifact: artifact.to_string(),
                    source,
                })?;
            info!("{}", out);
        }
        Ok(())
    }

    pub fn download(&self, prefix: &str, artifacts: &[RelPath]) -> Result<(), TransferError> {
        for artifact in artifacts {
            let local = self.local_path(artifact);
            let out = self
                .store
                .copy(
                    &Location::Remote(remote_uri(prefix, artifact)),
                    &Location::Local(local.clone()),
                )
                .map_err(|source| TransferError::Download {
                    artifact: artifact.to_string(),
                    source,
                })?;
            info!("{}", out);
            log_digest("download", &local);
        }
        Ok(())
    }

    /// Recursively delete everything under `prefix`.
    pub fn teardown(&self, prefix: &str) -> Result<(), TransferError> {
        let out = self
            .store
            .remove_recursive(prefix)
            .map_err(|source| TransferError::Teardown {
                prefix: prefix.to_string(),
                source,
            })?;
        info!("{}", out);
        Ok(())
    }
}

fn log_digest(direction: &str, path: &Path) {
    match file_sha256(path) {
        Ok(digest) => debug!("{} {} sha256={}", direction, path.display(), digest),
        Err(e) => debug!("{} {}: digest unavailable: {}", direction, path.display(), e),
    }
}

/// Hex SHA-256 of a local file.
pub fn file_sha256(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Releases a staged location: downloads outputs, then tears down.
///
/// `release` runs the step explicitly and reports its outcome. A guard that
/// is dropped unreleased (an early return or a panic unwinding through the
/// run) performs the same step and logs any failure.
pub struct StagingGuard<'a> {
    pipeline: &'a StagingPipeline<'a>,
    spec: &'a StagingSpec,
    released: bool,
}

impl<'a> StagingGuard<'a> {
    pub fn new(pipeline: &'a StagingPipeline<'a>, spec: &'a StagingSpec) -> Self {
        Self {
            pipeline,
            spec,
            released: false,
        }
    }

    pub fn release(mut self) -> Result<(), TransferError> {
        self.released = true;
        self.cleanup()
    }

    /// Fail-open: a failed download does not skip the teardown, and the
    /// download error wins when both fail.
    fn cleanup(&self) -> Result<(), TransferError> {
        let Some(prefix) = self.spec.remote_prefix() else {
            return Ok(());
        };

        let downloaded = self.pipeline.download(&prefix, self.spec.downloads());
        if let Err(ref e) = downloaded {
            error!("{}", e);
        }

        let torn_down = if self.spec.teardown() {
            self.pipeline.teardown(&prefix)
        } else {
            Ok(())
        };
        if let (Err(_), Err(ref e)) = (&downloaded, &torn_down) {
            error!("{}", e);
        }

        downloaded.and(torn_down)
    }
}

impl Drop for StagingGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            if let Err(e) = self.cleanup() {
                error!("cleanup failed: {}", e);
            }
        }
    }
}
