use praxis::application::render::{excerpt, plain_text, reading_time_minutes, render_html};
use praxis::domain::rich_text::Document;

fn load(raw: &str) -> Document {
    Document::from_json_str(raw).expect("fixture is valid json")
}

#[test]
fn treatment_fixture_renders_every_supported_node() {
    let document = load(include_str!("fixtures/treatment_implants.json"));

    let expected = include_str!("fixtures/treatment_implants.html");
    assert_eq!(expected.trim_end(), render_html(&document));
}

#[test]
fn hostile_fixture_is_neutralised() {
    let document = load(include_str!("fixtures/hostile_input.json"));
    let html = render_html(&document);

    let expected = include_str!("fixtures/hostile_input.html");
    assert_eq!(expected.trim_end(), html);
    assert!(!html.contains("<script"));
    assert!(!html.contains("javascript:"));
}

#[test]
fn treatment_fixture_plain_text() {
    let document = load(include_str!("fixtures/treatment_implants.json"));

    insta::assert_snapshot!(
        plain_text(&document),
        @"Dental implants An implant replaces a missing tooth permanently. Costs & coverage vary*. Consultation Placement Crown Painless and quick. Read our care guide or call 030 1234567 kzbv.de Figure 1 H2O2 whitening: gel"
    );
    insta::assert_snapshot!(excerpt(&document, 40), @"Dental implants An implant replaces a…");
    assert_eq!(reading_time_minutes(&document), 1);
}

#[test]
fn rendering_is_deterministic() {
    let document = load(include_str!("fixtures/treatment_implants.json"));
    assert_eq!(render_html(&document), render_html(&document));
}

#[test]
fn deeply_nested_quotes_render_without_exhausting_the_stack() {
    use praxis::domain::rich_text::Node;

    let mut node = Node::text("deep");
    for _ in 0..100_000 {
        node = Node::Quote {
            children: vec![node],
        };
    }
    let document = Document::new(vec![node]);

    let html = render_html(&document);
    assert!(html.starts_with("<blockquote><blockquote>"));
    assert!(html.contains("deep"));
    assert_eq!(html.matches("</blockquote>").count(), 100_000);
}
