//! Editor document model.
//!
//! Documents arrive as JSON exported by the CMS rich-text editor: a `root`
//! object whose `children` are typed nodes (`paragraph`, `heading`, `list`,
//! `text`, ...). Decoding never fails. Missing roots, missing children and
//! missing payloads collapse to their empty forms, and unknown node types are
//! kept as [`Node::Unknown`] so their children still render.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, value::RawValue};
use tracing::warn;

/// Inline style bits carried by a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextFormat(u32);

impl TextFormat {
    pub const BOLD: Self = Self(1);
    pub const ITALIC: Self = Self(1 << 1);
    pub const STRIKETHROUGH: Self = Self(1 << 2);
    pub const UNDERLINE: Self = Self(1 << 3);
    pub const CODE: Self = Self(1 << 4);
    pub const SUBSCRIPT: Self = Self(1 << 5);
    pub const SUPERSCRIPT: Self = Self(1 << 6);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Heading level, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Level used when the editor omits the level or sends one outside `1..=6`.
    pub const DEFAULT: Self = Self(3);

    pub fn new(level: u8) -> Option<Self> {
        (1..=6).contains(&level).then_some(Self(level))
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    fn from_fields(object: &Map<String, Value>) -> Self {
        let from_tag = object
            .get("tag")
            .and_then(Value::as_str)
            .and_then(|tag| tag.strip_prefix('h').or_else(|| tag.strip_prefix('H')))
            .and_then(|digits| digits.parse::<u8>().ok());
        let from_level = object
            .get("level")
            .and_then(Value::as_u64)
            .and_then(|level| u8::try_from(level).ok());

        from_tag
            .or(from_level)
            .and_then(Self::new)
            .unwrap_or(Self::DEFAULT)
    }
}

impl Default for HeadingLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ListKind {
    Ordered,
    #[default]
    Unordered,
}

impl ListKind {
    fn from_fields(object: &Map<String, Value>) -> Self {
        match object.get("listType").and_then(Value::as_str) {
            Some("number") => return Self::Ordered,
            Some("bullet") | Some("check") => return Self::Unordered,
            _ => {}
        }

        match object.get("tag").and_then(Value::as_str) {
            Some("ol") => Self::Ordered,
            _ => Self::Unordered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub format: TextFormat,
}

impl TextRun {
    pub fn new(text: impl Into<String>, format: TextFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextFormat::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTarget {
    pub url: String,
    pub new_tab: bool,
}

/// One node of an editor document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(TextRun),
    Paragraph {
        children: Vec<Node>,
    },
    Heading {
        level: HeadingLevel,
        children: Vec<Node>,
    },
    Quote {
        children: Vec<Node>,
    },
    List {
        kind: ListKind,
        start: Option<u32>,
        children: Vec<Node>,
    },
    ListItem {
        children: Vec<Node>,
    },
    Link {
        target: LinkTarget,
        children: Vec<Node>,
    },
    LineBreak,
    HorizontalRule,
    /// A node type this crate does not know. Rendered as its children only.
    Unknown {
        kind: String,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextRun::plain(text))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::Quote { children }
            | Node::List { children, .. }
            | Node::ListItem { children }
            | Node::Link { children, .. }
            | Node::Unknown { children, .. } => children,
            Node::Text(_) | Node::LineBreak | Node::HorizontalRule => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::Quote { children }
            | Node::List { children, .. }
            | Node::ListItem { children }
            | Node::Link { children, .. }
            | Node::Unknown { children, .. } => Some(children),
            Node::Text(_) | Node::LineBreak | Node::HorizontalRule => None,
        }
    }

    /// Whether the node starts a new block in flowing text.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Node::Paragraph { .. }
                | Node::Heading { .. }
                | Node::Quote { .. }
                | Node::List { .. }
                | Node::ListItem { .. }
                | Node::HorizontalRule
        )
    }
}

/// An editor document: the ordered top-level blocks under `root`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Decode an already-parsed JSON value. Anything that is not an object with
    /// a `root.children` array yields the empty document.
    pub fn from_value(value: &Value) -> Self {
        let children = value
            .get("root")
            .and_then(Value::as_object)
            .map(decode_children)
            .unwrap_or_default();
        Self { children }
    }

    /// Parse raw JSON. Only syntax errors surface; every structural gap is
    /// normalised by [`Document::from_value`].
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(&value))
    }
}

/// Embedded documents are captured as raw JSON first, which the enclosing
/// record's parser skips without a depth limit. A body the value parser then
/// rejects (too deep, or otherwise unparsable) becomes the empty document so
/// the rest of the record still loads.
impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Self::from_json_str(raw.get()).unwrap_or_else(|err| {
            warn!(
                target = "praxis::content",
                error = %err,
                "rich-text body could not be decoded; treating it as empty"
            );
            Self::empty()
        }))
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        // Flatten before dropping so deep trees do not recurse through `Vec<Node>` drops.
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            if let Some(children) = node.children_mut() {
                pending.append(children);
            }
        }
    }
}

/// A node whose children are still being decoded.
struct Pending<'a> {
    node: Node,
    items: std::slice::Iter<'a, Value>,
    children: Vec<Node>,
}

fn child_values(object: &Map<String, Value>) -> &[Value] {
    object
        .get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn attach(stack: &mut [Pending<'_>], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Decode the `children` of `object` depth-first with an explicit stack.
fn decode_children(object: &Map<String, Value>) -> Vec<Node> {
    let mut roots = Vec::new();
    let mut top_level = child_values(object).iter();
    let mut stack: Vec<Pending<'_>> = Vec::new();

    loop {
        let next = match stack.last_mut() {
            Some(pending) => pending.items.next(),
            None => top_level.next(),
        };

        match next {
            // Non-object entries are dropped.
            Some(value) => {
                let Some(object) = value.as_object() else {
                    continue;
                };
                let mut node = decode_shell(object);
                if node.children_mut().is_some() {
                    stack.push(Pending {
                        node,
                        items: child_values(object).iter(),
                        children: Vec::new(),
                    });
                } else {
                    attach(&mut stack, &mut roots, node);
                }
            }
            None => {
                let Some(Pending {
                    mut node, children, ..
                }) = stack.pop()
                else {
                    break;
                };
                if let Some(slot) = node.children_mut() {
                    *slot = children;
                }
                attach(&mut stack, &mut roots, node);
            }
        }
    }

    roots
}

/// Decode one node without its children.
fn decode_shell(object: &Map<String, Value>) -> Node {
    let kind = object.get("type").and_then(Value::as_str).unwrap_or("");

    match kind {
        "text" => Node::Text(TextRun {
            text: object
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            format: TextFormat::from_bits(
                object
                    .get("format")
                    .and_then(Value::as_u64)
                    .and_then(|bits| u32::try_from(bits).ok())
                    .unwrap_or(0),
            ),
        }),
        "paragraph" => Node::Paragraph {
            children: Vec::new(),
        },
        "heading" => Node::Heading {
            level: HeadingLevel::from_fields(object),
            children: Vec::new(),
        },
        "quote" => Node::Quote {
            children: Vec::new(),
        },
        "list" => {
            let kind = ListKind::from_fields(object);
            let start = match kind {
                ListKind::Ordered => object
                    .get("start")
                    .and_then(Value::as_u64)
                    .and_then(|start| u32::try_from(start).ok()),
                ListKind::Unordered => None,
            };
            Node::List {
                kind,
                start,
                children: Vec::new(),
            }
        }
        "listitem" => Node::ListItem {
            children: Vec::new(),
        },
        "link" | "autolink" => Node::Link {
            target: decode_link_target(object),
            children: Vec::new(),
        },
        "linebreak" => Node::LineBreak,
        "horizontalrule" => Node::HorizontalRule,
        other => Node::Unknown {
            kind: other.to_string(),
            children: Vec::new(),
        },
    }
}

/// Links carry their target either inline (`url`, `target`) or under the CMS
/// link field group (`fields.url`, `fields.newTab`).
fn decode_link_target(object: &Map<String, Value>) -> LinkTarget {
    let fields = object.get("fields").and_then(Value::as_object);
    let lookup = |key: &str| {
        fields
            .and_then(|fields| fields.get(key))
            .or_else(|| object.get(key))
    };

    let url = lookup("url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let new_tab = lookup("newTab").and_then(Value::as_bool).unwrap_or(false)
        || lookup("target").and_then(Value::as_str) == Some("_blank");

    LinkTarget { url, new_tab }
}
