use crate::application::error::{ErrorReport, HttpError};
use crate::domain::entities::ImageRef;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

const RENDER_SOURCE: &str = "presentation::views::render_template";

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template
        .render()
        .map(Html)
        .map_err(|err| {
            HttpError::from_error(RENDER_SOURCE, StatusCode::INTERNAL_SERVER_ERROR, &err)
        })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// The site's error page for `err`, wrapped in the usual chrome.
pub fn render_error_response(chrome: LayoutChrome, err: HttpError) -> Response {
    let status = err.status();
    let content = if status == StatusCode::NOT_FOUND {
        ErrorPageView::not_found()
    } else {
        ErrorPageView::unavailable()
    };

    let mut response = render_template_response(
        ErrorTemplate {
            view: LayoutContext::new(chrome, content),
        },
        status,
    );
    // A failed error page already carries its own report.
    if response.extensions().get::<ErrorReport>().is_none() {
        err.into_report().attach(&mut response);
    }
    response
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    render_error_response(
        chrome,
        HttpError::new(
            "presentation::views::render_not_found_response",
            StatusCode::NOT_FOUND,
            "no content at this path",
        ),
    )
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub tagline: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self {
            meta: self.meta.with_canonical(canonical),
            ..self
        }
    }

    /// Prefix the site title with the page title and mark the matching
    /// navigation entry.
    pub fn for_page(mut self, page_title: Option<&str>, path: &str) -> Self {
        if let Some(page_title) = page_title {
            self.meta.title = format!("{page_title} | {}", self.meta.title);
        }
        for entry in &mut self.navigation.entries {
            entry.is_active = if entry.href == "/" {
                path == "/"
            } else {
                path == entry.href || path.starts_with(&format!("{}/", entry.href))
            };
        }
        self
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

impl PageMetaView {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self { canonical, ..self }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageView {
    pub src: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl From<&ImageRef> for ImageView {
    fn from(image: &ImageRef) -> Self {
        Self {
            src: image.src.clone(),
            alt: image.alt.clone(),
            width: image.width,
            height: image.height,
        }
    }
}

#[derive(Clone)]
pub struct TreatmentCard {
    pub href: String,
    pub title: String,
    pub summary: String,
    pub image: Option<ImageView>,
}

#[derive(Clone)]
pub struct PostCard {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub author: Option<String>,
    pub published: Option<String>,
    pub iso_date: Option<String>,
    pub reading_minutes: u32,
    pub image: Option<ImageView>,
}

#[derive(Clone)]
pub struct WorkshopCard {
    pub title: String,
    pub starts: String,
    pub iso_date: String,
    pub location: Option<String>,
    pub image: Option<ImageView>,
    pub body_html: String,
}

#[derive(Clone)]
pub struct TeamMemberView {
    pub name: String,
    pub role: String,
    pub image: Option<ImageView>,
    pub bio_html: String,
}

pub struct HomeView {
    pub intro_html: Option<String>,
    pub treatments: Vec<TreatmentCard>,
    pub posts: Vec<PostCard>,
    pub workshops: Vec<WorkshopCard>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<HomeView>,
}

pub struct TreatmentListView {
    pub treatments: Vec<TreatmentCard>,
}

#[derive(Template)]
#[template(path = "treatments.html")]
pub struct TreatmentListTemplate {
    pub view: LayoutContext<TreatmentListView>,
}

pub struct TreatmentView {
    pub title: String,
    pub summary: Option<String>,
    pub image: Option<ImageView>,
    pub body_html: String,
}

#[derive(Template)]
#[template(path = "treatment.html")]
pub struct TreatmentTemplate {
    pub view: LayoutContext<TreatmentView>,
}

pub struct TeamView {
    pub members: Vec<TeamMemberView>,
}

#[derive(Template)]
#[template(path = "team.html")]
pub struct TeamTemplate {
    pub view: LayoutContext<TeamView>,
}

pub struct WorkshopListView {
    pub upcoming: Vec<WorkshopCard>,
    pub past: Vec<WorkshopCard>,
}

#[derive(Template)]
#[template(path = "workshops.html")]
pub struct WorkshopListTemplate {
    pub view: LayoutContext<WorkshopListView>,
}

pub struct BlogView {
    pub posts: Vec<PostCard>,
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub view: LayoutContext<BlogView>,
}

pub struct PostView {
    pub title: String,
    pub author: Option<String>,
    pub published: Option<String>,
    pub iso_date: Option<String>,
    pub reading_minutes: u32,
    pub image: Option<ImageView>,
    pub body_html: String,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostView>,
}

pub struct PageView {
    pub title: String,
    pub image: Option<ImageView>,
    pub body_html: String,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub view: LayoutContext<PageView>,
}

#[derive(Clone, Default)]
pub struct ContactFormView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

pub struct FieldErrorView {
    pub field: &'static str,
    pub message: &'static str,
}

pub struct NoticeView {
    pub kind: &'static str,
    pub message: String,
}

impl NoticeView {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }
}

pub struct ContactView {
    pub form: ContactFormView,
    pub errors: Vec<FieldErrorView>,
    pub notice: Option<NoticeView>,
}

impl ContactView {
    pub fn blank() -> Self {
        Self {
            form: ContactFormView::default(),
            errors: Vec::new(),
            notice: None,
        }
    }

    pub fn error_for(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub view: LayoutContext<ContactView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Our treatments, team and contact details are one click away on the homepage.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            title: "Something Went Wrong".to_string(),
            message: "This page could not be loaded right now. Please try again in a moment or give us a call.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome() -> LayoutChrome {
        LayoutChrome {
            brand: BrandView {
                title: "Praxis".into(),
                tagline: String::new(),
                href: "/".into(),
            },
            navigation: NavigationView {
                entries: ["/", "/treatments", "/blog"]
                    .into_iter()
                    .map(|href| NavigationLinkView {
                        label: href.into(),
                        href: href.into(),
                        is_active: false,
                    })
                    .collect(),
            },
            footer: FooterView {
                copy: String::new(),
            },
            meta: PageMetaView {
                title: "Praxis".into(),
                description: String::new(),
                canonical: String::new(),
            },
        }
    }

    fn active(chrome: &LayoutChrome) -> Vec<&str> {
        chrome
            .navigation
            .entries
            .iter()
            .filter(|entry| entry.is_active)
            .map(|entry| entry.href.as_str())
            .collect()
    }

    #[test]
    fn for_page_marks_section_and_prefixes_title() {
        let chrome = chrome().for_page(Some("Implants"), "/treatments/implants");
        assert_eq!(active(&chrome), vec!["/treatments"]);
        assert_eq!(chrome.meta.title, "Implants | Praxis");
    }

    #[test]
    fn home_is_only_active_on_root() {
        assert_eq!(active(&chrome().for_page(None, "/")), vec!["/"]);
        assert!(active(&chrome().for_page(None, "/blogroll")).is_empty());
    }

    #[test]
    fn not_found_page_renders_escaped_chrome() {
        let mut chrome = chrome();
        chrome.meta.title = "Smile & Co".into();
        let html = ErrorTemplate {
            view: LayoutContext::new(chrome, ErrorPageView::not_found()),
        }
        .render()
        .expect("render");

        assert!(html.contains("Page Not Found"));
        assert!(html.contains("Smile &#38; Co"));
        assert!(!html.contains("Smile & Co"));
        assert!(html.contains("href=\"/\""));
    }
}
