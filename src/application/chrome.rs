use crate::config::SiteSettings;
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationView, PageMetaView,
};

const NAVIGATION: &[(&str, &str)] = &[
    ("Home", "/"),
    ("Treatments", "/treatments"),
    ("Team", "/team"),
    ("Workshops", "/workshops"),
    ("Blog", "/blog"),
    ("Contact", "/contact"),
];

/// Site-wide layout data. Built once from settings and cloned per request.
#[derive(Clone)]
pub struct ChromeService {
    chrome: LayoutChrome,
    base_url: String,
}

impl ChromeService {
    pub fn new(site: &SiteSettings) -> Self {
        let base_url = site.base_url.trim_end_matches('/').to_string();
        let chrome = LayoutChrome {
            brand: BrandView {
                title: site.title.clone(),
                tagline: site.tagline.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView {
                entries: NAVIGATION
                    .iter()
                    .map(|(label, href)| NavigationLinkView {
                        label: (*label).to_string(),
                        href: (*href).to_string(),
                        is_active: false,
                    })
                    .collect(),
            },
            footer: FooterView {
                copy: site.footer_copy.clone(),
            },
            meta: PageMetaView {
                title: site.title.clone(),
                description: site.tagline.clone(),
                canonical: format!("{base_url}/"),
            },
        };

        Self { chrome, base_url }
    }

    /// Chrome for the page at `path`, titled after `page_title` when given.
    pub fn load(&self, page_title: Option<&str>, path: &str) -> LayoutChrome {
        self.chrome
            .clone()
            .for_page(page_title, path)
            .with_canonical(self.canonical_url(path))
    }

    pub fn canonical_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteSettings {
        SiteSettings {
            title: "Praxis Dr. Weber".into(),
            tagline: "Dentistry in the old town".into(),
            base_url: "https://praxis.example/".into(),
            footer_copy: "© Praxis Dr. Weber".into(),
        }
    }

    #[test]
    fn canonical_urls_join_without_double_slashes() {
        let chrome = ChromeService::new(&site());
        assert_eq!(chrome.canonical_url("/"), "https://praxis.example/");
        assert_eq!(
            chrome.canonical_url("/blog/hello"),
            "https://praxis.example/blog/hello"
        );
        assert_eq!(chrome.canonical_url("team"), "https://praxis.example/team");
    }

    #[test]
    fn load_applies_title_canonical_and_active_entry() {
        let chrome = ChromeService::new(&site()).load(Some("Team"), "/team");

        assert_eq!(chrome.meta.title, "Team | Praxis Dr. Weber");
        assert_eq!(chrome.meta.canonical, "https://praxis.example/team");
        assert_eq!(chrome.brand.tagline, "Dentistry in the old town");
        let active: Vec<_> = chrome
            .navigation
            .entries
            .iter()
            .filter(|entry| entry.is_active)
            .map(|entry| entry.label.as_str())
            .collect();
        assert_eq!(active, vec!["Team"]);
    }
}
