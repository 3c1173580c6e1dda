use std::fs;
use std::path::Path;

use praxis::application::repos::{ContentRepo, RepoError};
use praxis::infra::content::FileContentRepo;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create collection dir");
    }
    fs::write(path, contents).expect("write record");
}

fn content_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path();

    write(
        root,
        "pages/about.json",
        r#"{ "title": "About us", "description": "Who we are",
             "body": { "root": { "children": [
               { "type": "paragraph", "children": [{ "type": "text", "text": "Since 1998." }] }
             ]}}}"#,
    );

    write(
        root,
        "posts/older.json",
        r#"{ "title": "Older", "publishedAt": "2024-01-10T08:00:00Z" }"#,
    );
    write(
        root,
        "posts/newer.json",
        r#"{ "title": "Newer", "publishedAt": "2025-02-01T08:00:00Z" }"#,
    );
    write(root, "posts/undated.json", r#"{ "title": "Undated" }"#);
    write(
        root,
        "posts/secret.json",
        r#"{ "title": "Secret", "draft": true, "publishedAt": "2025-06-01T08:00:00Z" }"#,
    );
    write(root, "posts/notes.txt", "not a record");
    write(root, "posts/Bad_Name.json", r#"{ "title": "Ignored" }"#);

    write(root, "treatments/whitening.json", r#"{ "title": "Whitening", "order": 2 }"#);
    write(root, "treatments/implants.json", r#"{ "title": "Implants", "order": 1 }"#);
    write(root, "treatments/crowns.json", r#"{ "title": "Crowns", "order": 2 }"#);

    write(root, "team/weber.json", r#"{ "name": "Dr. Weber", "role": "Dentist", "order": 1 }"#);
    write(root, "team/anders.json", r#"{ "name": "Anders", "role": "Assistant", "order": 1 }"#);

    write(
        root,
        "workshops/late.json",
        r#"{ "title": "Late", "startsAt": "2025-09-01T17:00:00+02:00" }"#,
    );
    write(
        root,
        "workshops/early.json",
        r#"{ "title": "Early", "startsAt": "2025-05-01T17:00:00+02:00" }"#,
    );

    dir
}

#[tokio::test]
async fn pages_are_found_by_slug() {
    let dir = content_dir();
    let repo = FileContentRepo::new(dir.path());

    let page = repo.find_page("about").await.expect("read").expect("page");
    assert_eq!(page.slug, "about");
    assert_eq!(page.title, "About us");
    assert_eq!(page.description.as_deref(), Some("Who we are"));
    assert!(!page.body.is_empty());

    assert!(repo.find_page("contact").await.expect("read").is_none());
}

#[tokio::test]
async fn unsafe_slugs_never_reach_the_filesystem() {
    let dir = content_dir();
    let repo = FileContentRepo::new(dir.path());

    for slug in ["../pages/about", "About", "", "about.json", "a/b"] {
        assert!(repo.find_page(slug).await.expect("read").is_none(), "{slug}");
    }
}

#[tokio::test]
async fn posts_are_newest_first_without_drafts() {
    let dir = content_dir();
    let repo = FileContentRepo::new(dir.path());

    let slugs: Vec<String> = repo
        .list_posts()
        .await
        .expect("list")
        .into_iter()
        .map(|post| post.slug)
        .collect();
    assert_eq!(slugs, vec!["newer", "older", "undated"]);

    assert!(repo.find_post("secret").await.expect("read").is_none());
    assert!(repo.find_post("older").await.expect("read").is_some());
}

#[tokio::test]
async fn treatments_and_team_follow_their_order_field() {
    let dir = content_dir();
    let repo = FileContentRepo::new(dir.path());

    let treatments: Vec<String> = repo
        .list_treatments()
        .await
        .expect("list")
        .into_iter()
        .map(|treatment| treatment.title)
        .collect();
    assert_eq!(treatments, vec!["Implants", "Crowns", "Whitening"]);

    let team: Vec<String> = repo
        .list_team()
        .await
        .expect("list")
        .into_iter()
        .map(|member| member.name)
        .collect();
    assert_eq!(team, vec!["Anders", "Dr. Weber"]);
}

#[tokio::test]
async fn workshops_are_soonest_first() {
    let dir = content_dir();
    let repo = FileContentRepo::new(dir.path());

    let slugs: Vec<String> = repo
        .list_workshops()
        .await
        .expect("list")
        .into_iter()
        .map(|workshop| workshop.slug)
        .collect();
    assert_eq!(slugs, vec!["early", "late"]);
}

#[tokio::test]
async fn missing_collections_are_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let repo = FileContentRepo::new(dir.path());

    assert!(repo.list_posts().await.expect("list").is_empty());
    assert!(repo.list_workshops().await.expect("list").is_empty());
    assert!(repo.find_treatment("implants").await.expect("read").is_none());
}

#[tokio::test]
async fn malformed_records_are_decode_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "treatments/broken.json", r#"{ "title": "#);
    let repo = FileContentRepo::new(dir.path());

    let err = repo
        .find_treatment("broken")
        .await
        .expect_err("decode error");
    assert!(matches!(err, RepoError::Decode { .. }), "{err}");

}

#[tokio::test]
async fn listings_skip_records_that_fail_to_decode() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "treatments/broken.json", r#"{ "title": "#);
    write(dir.path(), "treatments/implants.json", r#"{ "title": "Implants", "order": 1 }"#);
    let repo = FileContentRepo::new(dir.path());

    let titles: Vec<String> = repo
        .list_treatments()
        .await
        .expect("list")
        .into_iter()
        .map(|treatment| treatment.title)
        .collect();
    assert_eq!(titles, vec!["Implants"]);
}

fn nested_quotes(depth: usize) -> String {
    let mut body = String::new();
    for _ in 0..depth {
        body.push_str(r#"{ "type": "quote", "children": ["#);
    }
    body.push_str(r#"{ "type": "text", "text": "deep" }"#);
    for _ in 0..depth {
        body.push_str("] }");
    }
    format!(r#"{{ "title": "Deep", "body": {{ "root": {{ "children": [{body}] }} }} }}"#)
}

#[tokio::test]
async fn overly_deep_bodies_load_as_empty_documents() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "pages/deep.json", &nested_quotes(70));
    write(dir.path(), "pages/nested.json", &nested_quotes(40));
    let repo = FileContentRepo::new(dir.path());

    let page = repo.find_page("deep").await.expect("read").expect("page");
    assert_eq!(page.title, "Deep");
    assert!(page.body.is_empty());

    let page = repo.find_page("nested").await.expect("read").expect("page");
    assert!(!page.body.is_empty());
}

#[tokio::test]
async fn malformed_rich_text_degrades_to_an_empty_body() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(
        dir.path(),
        "pages/odd.json",
        r#"{ "title": "Odd", "body": { "root": { "children": "nope" } } }"#,
    );
    let repo = FileContentRepo::new(dir.path());

    let page = repo.find_page("odd").await.expect("read").expect("page");
    assert!(page.body.is_empty());
}
