//! File-backed content source.
//!
//! Layout: `<root>/{pages,posts,treatments,team,workshops}/<slug>.json`.
//! A missing directory is an empty collection; a missing file is `None`.
//! Listings skip records that fail to decode; direct lookups report them.

use std::cmp::Reverse;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, warn};

use crate::application::repos::{ContentRepo, RepoError};
use crate::domain::entities::{
    PageRecord, PostRecord, SlugAddressed, TeamMemberRecord, TreatmentRecord, WorkshopRecord,
};
use crate::domain::slug::{is_valid_slug, parse_slug};

const EXTENSION: &str = "json";

#[derive(Debug, Clone, Copy)]
enum Collection {
    Pages,
    Posts,
    Treatments,
    Team,
    Workshops,
}

impl Collection {
    fn dir_name(self) -> &'static str {
        match self {
            Collection::Pages => "pages",
            Collection::Posts => "posts",
            Collection::Treatments => "treatments",
            Collection::Team => "team",
            Collection::Workshops => "workshops",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileContentRepo {
    root: PathBuf,
}

impl FileContentRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.dir_name())
    }

    async fn find<T>(&self, collection: Collection, slug: &str) -> Result<Option<T>, RepoError>
    where
        T: DeserializeOwned + SlugAddressed,
    {
        let slug = match parse_slug(slug) {
            Ok(slug) => slug,
            Err(err) => {
                debug!(target = "praxis::content", error = %err, "rejected lookup");
                return Ok(None);
            }
        };

        let path = self
            .collection_dir(collection)
            .join(format!("{slug}.{EXTENSION}"));
        read_record(&path, slug).await
    }

    async fn list<T>(&self, collection: Collection) -> Result<Vec<T>, RepoError>
    where
        T: DeserializeOwned + SlugAddressed,
    {
        let dir = self.collection_dir(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(RepoError::io(&dir, err)),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| RepoError::io(&dir, err))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if !is_valid_slug(slug) {
                debug!(
                    target = "praxis::content",
                    path = %path.display(),
                    "skipping file with invalid slug"
                );
                continue;
            }

            let slug = slug.to_string();
            match read_record(&path, &slug).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err @ RepoError::Decode { .. }) => {
                    warn!(
                        target = "praxis::content",
                        error = %err,
                        "skipping record that failed to decode"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(records)
    }
}

async fn read_record<T>(path: &Path, slug: &str) -> Result<Option<T>, RepoError>
where
    T: DeserializeOwned + SlugAddressed,
{
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(RepoError::io(path, err)),
    };

    let mut record: T = serde_json::from_slice(&raw).map_err(|err| RepoError::decode(path, err))?;
    record.assign_slug(slug.to_string());
    Ok(Some(record))
}

#[async_trait]
impl ContentRepo for FileContentRepo {
    async fn find_page(&self, slug: &str) -> Result<Option<PageRecord>, RepoError> {
        self.find(Collection::Pages, slug).await
    }

    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        let mut posts: Vec<PostRecord> = self
            .list::<PostRecord>(Collection::Posts)
            .await?
            .into_iter()
            .filter(|post| !post.draft)
            .collect();
        // Undated posts sort last; ties fall back to slug for a stable order.
        posts.sort_by(|a, b| {
            Reverse(a.published_at)
                .cmp(&Reverse(b.published_at))
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(posts)
    }

    async fn find_post(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let post: Option<PostRecord> = self.find(Collection::Posts, slug).await?;
        Ok(post.filter(|post| !post.draft))
    }

    async fn list_treatments(&self) -> Result<Vec<TreatmentRecord>, RepoError> {
        let mut treatments: Vec<TreatmentRecord> = self.list(Collection::Treatments).await?;
        treatments.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.title.cmp(&b.title)));
        Ok(treatments)
    }

    async fn find_treatment(&self, slug: &str) -> Result<Option<TreatmentRecord>, RepoError> {
        self.find(Collection::Treatments, slug).await
    }

    async fn list_team(&self) -> Result<Vec<TeamMemberRecord>, RepoError> {
        let mut team: Vec<TeamMemberRecord> = self.list(Collection::Team).await?;
        team.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        Ok(team)
    }

    async fn list_workshops(&self) -> Result<Vec<WorkshopRecord>, RepoError> {
        let mut workshops: Vec<WorkshopRecord> = self.list(Collection::Workshops).await?;
        workshops.sort_by(|a, b| {
            a.starts_at
                .cmp(&b.starts_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(workshops)
    }
}
