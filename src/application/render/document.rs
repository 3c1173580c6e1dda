use std::slice;

use url::Url;

use crate::domain::rich_text::{Document, LinkTarget, ListKind, Node, TextFormat, TextRun};

use super::tree::{Attribute, Element, Fragment, TagName};

/// Inline wrappers in nesting order, outermost first.
const FORMAT_WRAPPERS: [(TextFormat, TagName); 7] = [
    (TextFormat::BOLD, TagName::Strong),
    (TextFormat::ITALIC, TagName::Emphasis),
    (TextFormat::UNDERLINE, TagName::Underline),
    (TextFormat::STRIKETHROUGH, TagName::Strikethrough),
    (TextFormat::CODE, TagName::Code),
    (TextFormat::SUBSCRIPT, TagName::Subscript),
    (TextFormat::SUPERSCRIPT, TagName::Superscript),
];

const ALLOWED_LINK_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// Render a document into a presentational element tree.
///
/// Walks the document with an explicit stack of open frames, so input depth
/// is bounded by heap rather than by the call stack.
pub fn render(document: &Document) -> Fragment {
    let mut frames = vec![Frame::new(Wrapper::Transparent, Context::Flow, document.children())];

    loop {
        let Some(frame) = frames.last_mut() else {
            return Fragment::default();
        };

        if let Some(node) = frame.pending.next() {
            match open(node, frame.context) {
                Step::Leaf(element) => frame.output.push(element),
                Step::Branch(next) => frames.push(next),
            }
            continue;
        }

        let Some(finished) = frames.pop() else {
            return Fragment::default();
        };
        let elements = finished.close();
        match frames.last_mut() {
            Some(parent) => parent.output.extend(elements),
            None => return Fragment::new(elements),
        }
    }
}

/// Render a document straight to markup. Equivalent to `render(document).to_html()`.
pub fn render_html(document: &Document) -> String {
    render(document).to_html()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Flow,
    List,
}

enum Wrapper {
    Transparent,
    Tag(TagName, Vec<Attribute>),
}

struct Frame<'a> {
    wrapper: Wrapper,
    context: Context,
    pending: slice::Iter<'a, Node>,
    output: Vec<Element>,
}

impl<'a> Frame<'a> {
    fn new(wrapper: Wrapper, context: Context, children: &'a [Node]) -> Self {
        Self {
            wrapper,
            context,
            pending: children.iter(),
            output: Vec::with_capacity(children.len()),
        }
    }

    fn close(self) -> Vec<Element> {
        match self.wrapper {
            Wrapper::Transparent => self.output,
            Wrapper::Tag(name, attributes) => vec![Element::tag(name, attributes, self.output)],
        }
    }
}

enum Step<'a> {
    Leaf(Element),
    Branch(Frame<'a>),
}

fn open(node: &Node, context: Context) -> Step<'_> {
    match node {
        Node::Text(run) => Step::Leaf(render_text(run)),
        Node::LineBreak => Step::Leaf(Element::tag(TagName::LineBreak, vec![], vec![])),
        Node::HorizontalRule => Step::Leaf(Element::tag(TagName::HorizontalRule, vec![], vec![])),
        Node::Paragraph { children } => element(TagName::Paragraph, children),
        Node::Heading { level, children } => element(TagName::Heading(level.get()), children),
        Node::Quote { children } => element(TagName::Blockquote, children),
        Node::List {
            kind,
            start,
            children,
        } => {
            let (name, attributes) = match (kind, start) {
                (ListKind::Ordered, Some(start)) if *start != 1 => (
                    TagName::OrderedList,
                    vec![Attribute::new("start", start.to_string())],
                ),
                (ListKind::Ordered, _) => (TagName::OrderedList, Vec::new()),
                (ListKind::Unordered, _) => (TagName::UnorderedList, Vec::new()),
            };
            Step::Branch(Frame::new(
                Wrapper::Tag(name, attributes),
                Context::List,
                children,
            ))
        }
        Node::ListItem { children } => match context {
            Context::List => element(TagName::ListItem, children),
            Context::Flow => Step::Branch(Frame::new(
                Wrapper::Tag(TagName::Div, vec![Attribute::new("class", "list-item")]),
                Context::Flow,
                children,
            )),
        },
        Node::Link { target, children } => match link_attributes(target) {
            Some(attributes) => Step::Branch(Frame::new(
                Wrapper::Tag(TagName::Anchor, attributes),
                Context::Flow,
                children,
            )),
            None => Step::Branch(Frame::new(Wrapper::Transparent, context, children)),
        },
        Node::Unknown { children, .. } => {
            Step::Branch(Frame::new(Wrapper::Transparent, context, children))
        }
    }
}

fn element(name: TagName, children: &[Node]) -> Step<'_> {
    Step::Branch(Frame::new(
        Wrapper::Tag(name, Vec::new()),
        Context::Flow,
        children,
    ))
}

fn render_text(run: &TextRun) -> Element {
    FORMAT_WRAPPERS
        .iter()
        .rev()
        .filter(|(format, _)| run.format.contains(*format))
        .fold(Element::text(run.text.as_str()), |inner, (_, name)| {
            Element::tag(*name, vec![], vec![inner])
        })
}

/// Anchor attributes for a link, or `None` when the target must not become an
/// anchor (empty or a scheme outside the allow-list).
fn link_attributes(target: &LinkTarget) -> Option<Vec<Attribute>> {
    let href = safe_href(&target.url)?;
    let mut attributes = vec![Attribute::new("href", href)];
    if target.new_tab {
        attributes.push(Attribute::new("target", "_blank"));
        attributes.push(Attribute::new("rel", "noopener noreferrer"));
    }
    Some(attributes)
}

fn safe_href(url: &str) -> Option<&str> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    match Url::parse(trimmed) {
        Ok(parsed) => ALLOWED_LINK_SCHEMES
            .contains(&parsed.scheme())
            .then_some(trimmed),
        Err(url::ParseError::RelativeUrlWithoutBase) => Some(trimmed),
        Err(_) => None,
    }
}
