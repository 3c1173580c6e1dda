//! Content records as exported by the CMS.
//!
//! Every record is one JSON file. The slug comes from the file name, so it is
//! never read from the payload.

use serde::Deserialize;
use time::OffsetDateTime;

use crate::domain::rich_text::Document;

/// Reference to an image hosted by the CMS media library.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageRecord {
    #[serde(skip)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub body: Document,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(skip)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub body: Document,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreatmentRecord {
    #[serde(skip)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub body: Document,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamMemberRecord {
    #[serde(skip)]
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub bio: Document,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopRecord {
    #[serde(skip)]
    pub slug: String,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub body: Document,
}

/// Records addressed by the slug taken from their file name.
pub trait SlugAddressed {
    fn assign_slug(&mut self, slug: String);
}

macro_rules! impl_slug_addressed {
    ($($record:ty),+ $(,)?) => {
        $(
            impl SlugAddressed for $record {
                fn assign_slug(&mut self, slug: String) {
                    self.slug = slug;
                }
            }
        )+
    };
}

impl_slug_addressed!(
    PageRecord,
    PostRecord,
    TreatmentRecord,
    TeamMemberRecord,
    WorkshopRecord,
);
