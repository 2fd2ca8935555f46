//! Artifact staging
//!
//! `StagingSpec` describes where artifacts live remotely and which ones move
//! in each direction. `StagingPipeline` performs the transfers and
//! `StagingGuard` ties the download + teardown step to every exit path of a
//! run.

mod path;
mod pipeline;

pub use path::{shell_quote, PathError, RelPath};
pub use pipeline::{StagingGuard, StagingPipeline, TransferError};

use tracing::warn;

/// Staging configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StagingError {
    #[error("--uploads and --downloads require --bucket")]
    ArtifactsWithoutBucket,

    #[error("invalid artifact {artifact:?}: {source}")]
    InvalidArtifact {
        artifact: String,
        #[source]
        source: PathError,
    },

    #[error("invalid working directory {workdir:?}: {source}")]
    InvalidWorkdir {
        workdir: String,
        #[source]
        source: PathError,
    },

    #[error("bucket must not be empty")]
    EmptyBucket,
}

/// Remote location, working directory and artifact lists for one run.
///
/// Construction enforces that artifacts are only named when a bucket is
/// present; nothing downstream re-checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingSpec {
    bucket: Option<String>,
    workdir: RelPath,
    uploads: Vec<RelPath>,
    downloads: Vec<RelPath>,
    teardown: bool,
}

impl StagingSpec {
    pub fn new<S: AsRef<str>>(
        bucket: Option<&str>,
        workdir: &str,
        uploads: &[S],
        downloads: &[S],
        teardown: bool,
    ) -> Result<Self, StagingError> {
        let bucket = match bucket {
            Some(raw) => {
                let trimmed = raw.trim().trim_end_matches('/');
                if trimmed.is_empty() {
                    return Err(StagingError::EmptyBucket);
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        if bucket.is_none() && (!uploads.is_empty() || !downloads.is_empty()) {
            return Err(StagingError::ArtifactsWithoutBucket);
        }
        if bucket.is_some() && uploads.is_empty() && downloads.is_empty() {
            warn!("--bucket specified without --uploads or --downloads");
        }

        let workdir = RelPath::parse(workdir).map_err(|source| StagingError::InvalidWorkdir {
            workdir: workdir.to_string(),
            source,
        })?;

        Ok(Self {
            bucket,
            workdir,
            uploads: parse_artifacts(uploads)?,
            downloads: parse_artifacts(downloads)?,
            teardown,
        })
    }

    /// No bucket, no artifacts.
    pub fn unstaged(workdir: &str) -> Result<Self, StagingError> {
        Self::new::<&str>(None, workdir, &[], &[], false)
    }

    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    pub fn workdir(&self) -> &RelPath {
        &self.workdir
    }

    pub fn uploads(&self) -> &[RelPath] {
        &self.uploads
    }

    pub fn downloads(&self) -> &[RelPath] {
        &self.downloads
    }

    pub fn teardown(&self) -> bool {
        self.teardown
    }

    pub fn is_staged(&self) -> bool {
        self.bucket.is_some()
    }

    /// `<bucket>/<workdir>`, the prefix everything is staged under.
    pub fn remote_prefix(&self) -> Option<String> {
        self.bucket
            .as_ref()
            .map(|bucket| format!("{}/{}", bucket, self.workdir))
    }
}

fn parse_artifacts<S: AsRef<str>>(raw: &[S]) -> Result<Vec<RelPath>, StagingError> {
    raw.iter()
        .map(|artifact| {
            let artifact = artifact.as_ref();
            RelPath::parse(artifact).map_err(|source| StagingError::InvalidArtifact {
                artifact: artifact.to_string(),
                source,
            })
        })
        .collect()
}

/// `<prefix>/<artifact>`
pub fn remote_uri(prefix: &str, artifact: &RelPath) -> String {
    format!("{}/{}", prefix, artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifacts_require_bucket() {
        let err = StagingSpec::new(None, "tmp", &["data.csv"], &[], true).unwrap_err();
        assert_eq!(err, StagingError::ArtifactsWithoutBucket);

        let err = StagingSpec::new(None, "tmp", &[], &["out.json"], true).unwrap_err();
        assert_eq!(err, StagingError::ArtifactsWithoutBucket);
    }

    #[test]
    fn test_bucket_without_artifacts_is_allowed() {
        let spec = StagingSpec::new::<&str>(Some("s3://bkt"), "tmp", &[], &[], true).unwrap();
        assert!(spec.is_staged());
        assert_eq!(spec.remote_prefix().as_deref(), Some("s3://bkt/tmp"));
    }

    #[test]
    fn test_trailing_slash_collapsed() {
        let spec = StagingSpec::new(Some("s3://bkt/runs/"), "tmp", &["a.csv"], &[], true).unwrap();
        assert_eq!(spec.remote_prefix().as_deref(), Some("s3://bkt/runs/tmp"));
        assert_eq!(remote_uri("s3://bkt/runs/tmp", &spec.uploads()[0]), "s3://bkt/runs/tmp/a.csv");
    }

    #[test]
    fn test_invalid_artifact_rejected() {
        let err = StagingSpec::new(Some("s3://bkt"), "tmp", &["../x"], &[], true).unwrap_err();
        assert!(matches!(err, StagingError::InvalidArtifact { .. }));
    }

    #[test]
    fn test_invalid_workdir_rejected() {
        let err = StagingSpec::unstaged("/abs").unwrap_err();
        assert!(matches!(err, StagingError::InvalidWorkdir { .. }));
    }

    #[test]
    fn test_empty_bucket_rejected() {
        let err = StagingSpec::new::<&str>(Some("  "), "tmp", &[], &[], true).unwrap_err();
        assert_eq!(err, StagingError::EmptyBucket);
    }

    #[test]
    fn test_unstaged() {
        let spec = StagingSpec::unstaged("tmp").unwrap();
        assert!(!spec.is_staged());
        assert!(spec.remote_prefix().is_none());
        assert!(spec.uploads().is_empty());
    }
}
