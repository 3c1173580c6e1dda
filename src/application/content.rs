use std::sync::Arc;

use axum::http::StatusCode;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use time::format_description::well_known::Rfc3339;

use crate::application::error::HttpError;
use crate::application::render::{excerpt, render_html, reading_time_minutes};
use crate::application::repos::{ContentRepo, RepoError};
use crate::domain::entities::{PostRecord, TeamMemberRecord, TreatmentRecord, WorkshopRecord};
use crate::presentation::views::{
    BlogView, HomeView, ImageView, PageView, PostCard, PostView, TeamMemberView, TeamView,
    TreatmentCard, TreatmentListView, TreatmentView, WorkshopCard, WorkshopListView,
};

const SOURCE: &str = "application::content::ContentService";

const HOME_PAGE_SLUG: &str = "home";
const HOME_TREATMENTS: usize = 6;
const HOME_POSTS: usize = 3;
const HOME_WORKSHOPS: usize = 3;
const POST_EXCERPT_CHARS: usize = 220;
const TREATMENT_SUMMARY_CHARS: usize = 160;

const DISPLAY_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
const DISPLAY_DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year], [hour]:[minute]");

/// Loads content records, renders their documents and shapes view models.
#[derive(Clone)]
pub struct ContentService {
    repo: Arc<dyn ContentRepo>,
}

impl ContentService {
    pub fn new(repo: Arc<dyn ContentRepo>) -> Self {
        Self { repo }
    }

    pub async fn home(&self) -> Result<HomeView, HttpError> {
        self.home_at(OffsetDateTime::now_utc()).await
    }

    pub async fn home_at(&self, now: OffsetDateTime) -> Result<HomeView, HttpError> {
        let intro_html = self
            .repo
            .find_page(HOME_PAGE_SLUG)
            .await
            .map_err(|err| repo_failure("find_page", err))?
            .map(|page| render_html(&page.body));

        let treatments = self
            .repo
            .list_treatments()
            .await
            .map_err(|err| repo_failure("list_treatments", err))?
            .iter()
            .take(HOME_TREATMENTS)
            .map(treatment_card)
            .collect();

        let posts = self
            .repo
            .list_posts()
            .await
            .map_err(|err| repo_failure("list_posts", err))?
            .iter()
            .take(HOME_POSTS)
            .map(post_card)
            .collect::<Result<Vec<_>, _>>()?;

        let workshops = self
            .repo
            .list_workshops()
            .await
            .map_err(|err| repo_failure("list_workshops", err))?
            .iter()
            .filter(|workshop| workshop.starts_at >= now)
            .take(HOME_WORKSHOPS)
            .map(workshop_card)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HomeView {
            intro_html,
            treatments,
            posts,
            workshops,
        })
    }

    pub async fn treatments(&self) -> Result<TreatmentListView, HttpError> {
        let treatments = self
            .repo
            .list_treatments()
            .await
            .map_err(|err| repo_failure("list_treatments", err))?;

        Ok(TreatmentListView {
            treatments: treatments.iter().map(treatment_card).collect(),
        })
    }

    pub async fn treatment(&self, slug: &str) -> Result<Option<TreatmentView>, HttpError> {
        let record = self
            .repo
            .find_treatment(slug)
            .await
            .map_err(|err| repo_failure("find_treatment", err))?;

        Ok(record.map(|record| TreatmentView {
            body_html: render_html(&record.body),
            image: record.image.as_ref().map(ImageView::from),
            summary: record.summary,
            title: record.title,
        }))
    }

    pub async fn team(&self) -> Result<TeamView, HttpError> {
        let members = self
            .repo
            .list_team()
            .await
            .map_err(|err| repo_failure("list_team", err))?;

        Ok(TeamView {
            members: members.iter().map(team_member).collect(),
        })
    }

    pub async fn workshops(&self) -> Result<WorkshopListView, HttpError> {
        self.workshops_at(OffsetDateTime::now_utc()).await
    }

    /// Workshops split around `now`: upcoming soonest first, past most recent first.
    pub async fn workshops_at(&self, now: OffsetDateTime) -> Result<WorkshopListView, HttpError> {
        let workshops = self
            .repo
            .list_workshops()
            .await
            .map_err(|err| repo_failure("list_workshops", err))?;

        let (upcoming, past): (Vec<_>, Vec<_>) = workshops
            .iter()
            .partition(|workshop| workshop.starts_at >= now);

        Ok(WorkshopListView {
            upcoming: upcoming
                .into_iter()
                .map(workshop_card)
                .collect::<Result<_, _>>()?,
            past: past
                .into_iter()
                .rev()
                .map(workshop_card)
                .collect::<Result<_, _>>()?,
        })
    }

    pub async fn posts(&self) -> Result<BlogView, HttpError> {
        let posts = self
            .repo
            .list_posts()
            .await
            .map_err(|err| repo_failure("list_posts", err))?;

        Ok(BlogView {
            posts: posts.iter().map(post_card).collect::<Result<_, _>>()?,
        })
    }

    pub async fn post(&self, slug: &str) -> Result<Option<(PostView, String)>, HttpError> {
        let record = self
            .repo
            .find_post(slug)
            .await
            .map_err(|err| repo_failure("find_post", err))?;

        let Some(record) = record else {
            return Ok(None);
        };

        let description = post_excerpt(&record);
        let view = PostView {
            published: record.published_at.map(format_date).transpose()?,
            iso_date: record.published_at.map(iso_date).transpose()?,
            reading_minutes: reading_time_minutes(&record.body),
            image: record.image.as_ref().map(ImageView::from),
            body_html: render_html(&record.body),
            author: record.author,
            title: record.title,
        };

        Ok(Some((view, description)))
    }

    pub async fn page(&self, slug: &str) -> Result<Option<(PageView, Option<String>)>, HttpError> {
        let record = self
            .repo
            .find_page(slug)
            .await
            .map_err(|err| repo_failure("find_page", err))?;

        Ok(record.map(|record| {
            let view = PageView {
                body_html: render_html(&record.body),
                image: record.image.as_ref().map(ImageView::from),
                title: record.title,
            };
            (view, record.description)
        }))
    }
}

fn repo_failure(operation: &'static str, err: RepoError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("{operation} failed: {err}"),
    )
}

fn format_failure(err: time::error::Format) -> HttpError {
    HttpError::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, &err)
}

fn format_date(at: OffsetDateTime) -> Result<String, HttpError> {
    at.format(DISPLAY_DATE).map_err(format_failure)
}

fn iso_date(at: OffsetDateTime) -> Result<String, HttpError> {
    at.format(&Rfc3339).map_err(format_failure)
}

fn treatment_card(record: &TreatmentRecord) -> TreatmentCard {
    let summary = match record.summary.as_deref() {
        Some(summary) if !summary.trim().is_empty() => summary.to_string(),
        _ => excerpt(&record.body, TREATMENT_SUMMARY_CHARS),
    };

    TreatmentCard {
        href: format!("/treatments/{}", record.slug),
        title: record.title.clone(),
        summary,
        image: record.image.as_ref().map(ImageView::from),
    }
}

fn post_excerpt(record: &PostRecord) -> String {
    match record.excerpt.as_deref() {
        Some(excerpt) if !excerpt.trim().is_empty() => excerpt.to_string(),
        _ => excerpt(&record.body, POST_EXCERPT_CHARS),
    }
}

fn post_card(record: &PostRecord) -> Result<PostCard, HttpError> {
    Ok(PostCard {
        href: format!("/blog/{}", record.slug),
        title: record.title.clone(),
        excerpt: post_excerpt(record),
        author: record.author.clone(),
        published: record.published_at.map(format_date).transpose()?,
        iso_date: record.published_at.map(iso_date).transpose()?,
        reading_minutes: reading_time_minutes(&record.body),
        image: record.image.as_ref().map(ImageView::from),
    })
}

fn workshop_card(record: &WorkshopRecord) -> Result<WorkshopCard, HttpError> {
    Ok(WorkshopCard {
        title: record.title.clone(),
        starts: record
            .starts_at
            .format(DISPLAY_DATE_TIME)
            .map_err(format_failure)?,
        iso_date: iso_date(record.starts_at)?,
        location: record.location.clone(),
        image: record.image.as_ref().map(ImageView::from),
        body_html: render_html(&record.body),
    })
}

fn team_member(record: &TeamMemberRecord) -> TeamMemberView {
    TeamMemberView {
        name: record.name.clone(),
        role: record.role.clone(),
        image: record.image.as_ref().map(ImageView::from),
        bio_html: render_html(&record.bio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use time::macros::datetime;

    use crate::domain::entities::PageRecord;
    use crate::domain::rich_text::Document;

    fn body(text: &str) -> Document {
        Document::from_value(&json!({
            "root": {"children": [
                {"type": "paragraph", "children": [{"type": "text", "text": text}]}
            ]}
        }))
    }

    fn workshop(slug: &str, starts_at: OffsetDateTime) -> WorkshopRecord {
        WorkshopRecord {
            slug: slug.into(),
            title: slug.to_uppercase(),
            starts_at,
            location: None,
            image: None,
            body: Document::empty(),
        }
    }

    #[derive(Default)]
    struct StaticContent {
        pages: Vec<PageRecord>,
        posts: Vec<PostRecord>,
        workshops: Vec<WorkshopRecord>,
        fail: bool,
    }

    impl StaticContent {
        fn check(&self) -> Result<(), RepoError> {
            if self.fail {
                Err(RepoError::decode("content/posts/broken.json", "expected value"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ContentRepo for StaticContent {
        async fn find_page(&self, slug: &str) -> Result<Option<PageRecord>, RepoError> {
            self.check()?;
            Ok(self.pages.iter().find(|page| page.slug == slug).cloned())
        }

        async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
            self.check()?;
            Ok(self.posts.clone())
        }

        async fn find_post(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
            self.check()?;
            Ok(self.posts.iter().find(|post| post.slug == slug).cloned())
        }

        async fn list_treatments(&self) -> Result<Vec<TreatmentRecord>, RepoError> {
            self.check()?;
            Ok(Vec::new())
        }

        async fn find_treatment(&self, _slug: &str) -> Result<Option<TreatmentRecord>, RepoError> {
            self.check()?;
            Ok(None)
        }

        async fn list_team(&self) -> Result<Vec<TeamMemberRecord>, RepoError> {
            self.check()?;
            Ok(Vec::new())
        }

        async fn list_workshops(&self) -> Result<Vec<WorkshopRecord>, RepoError> {
            self.check()?;
            Ok(self.workshops.clone())
        }
    }

    #[tokio::test]
    async fn post_view_renders_body_and_formats_date() {
        let service = ContentService::new(Arc::new(StaticContent {
            posts: vec![PostRecord {
                slug: "whitening".into(),
                title: "Whitening".into(),
                author: Some("Dr. Weber".into()),
                published_at: Some(datetime!(2025-03-04 09:30 UTC)),
                excerpt: None,
                image: None,
                draft: false,
                body: body("Bright <smiles> ahead."),
            }],
            ..Default::default()
        }));

        let (view, description) = service
            .post("whitening")
            .await
            .expect("load")
            .expect("found");

        assert_eq!(view.body_html, "<p>Bright &lt;smiles&gt; ahead.</p>");
        assert_eq!(view.published.as_deref(), Some("March 4, 2025"));
        assert_eq!(view.iso_date.as_deref(), Some("2025-03-04T09:30:00Z"));
        assert_eq!(view.reading_minutes, 1);
        assert_eq!(description, "Bright <smiles> ahead.");
        assert!(service.post("missing").await.expect("load").is_none());
    }

    #[tokio::test]
    async fn workshops_split_around_now() {
        let service = ContentService::new(Arc::new(StaticContent {
            workshops: vec![
                workshop("older", datetime!(2025-01-10 18:00 UTC)),
                workshop("recent", datetime!(2025-05-10 18:00 UTC)),
                workshop("next", datetime!(2025-07-01 18:00 UTC)),
                workshop("later", datetime!(2025-09-01 18:00 UTC)),
            ],
            ..Default::default()
        }));

        let view = service
            .workshops_at(datetime!(2025-06-01 00:00 UTC))
            .await
            .expect("load");

        let titles = |cards: &[WorkshopCard]| -> Vec<String> {
            cards.iter().map(|card| card.title.clone()).collect()
        };
        assert_eq!(titles(&view.upcoming), vec!["NEXT", "LATER"]);
        assert_eq!(titles(&view.past), vec!["RECENT", "OLDER"]);
        assert_eq!(view.upcoming[0].starts, "July 1, 2025, 18:00");
    }

    #[tokio::test]
    async fn home_uses_intro_page_when_present() {
        let service = ContentService::new(Arc::new(StaticContent {
            pages: vec![PageRecord {
                slug: HOME_PAGE_SLUG.into(),
                title: "Welcome".into(),
                description: None,
                image: None,
                body: body("Welcome to our practice."),
            }],
            ..Default::default()
        }));

        let home = service.home().await.expect("load");
        assert_eq!(
            home.intro_html.as_deref(),
            Some("<p>Welcome to our practice.</p>")
        );
        assert!(home.treatments.is_empty());
    }

    #[tokio::test]
    async fn repo_failures_become_internal_errors() {
        let service = ContentService::new(Arc::new(StaticContent {
            fail: true,
            ..Default::default()
        }));

        let err = service.posts().await.err().expect("failure");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
