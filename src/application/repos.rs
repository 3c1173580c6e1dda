//! Repository traits describing the content source.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{
    PageRecord, PostRecord, TeamMemberRecord, TreatmentRecord, WorkshopRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode `{path}`: {message}")]
    Decode { path: PathBuf, message: String },
}

impl RepoError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn decode(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Read access to editor-authored content.
///
/// Lookups return `Ok(None)` for unknown or malformed slugs. Listings are
/// already ordered for display: posts newest first, treatments and team by
/// their `order` field, workshops soonest first. Draft posts are never
/// returned.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn find_page(&self, slug: &str) -> Result<Option<PageRecord>, RepoError>;

    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_post(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;

    async fn list_treatments(&self) -> Result<Vec<TreatmentRecord>, RepoError>;

    async fn find_treatment(&self, slug: &str) -> Result<Option<TreatmentRecord>, RepoError>;

    async fn list_team(&self) -> Result<Vec<TeamMemberRecord>, RepoError>;

    async fn list_workshops(&self) -> Result<Vec<WorkshopRecord>, RepoError>;
}
