use std::fmt;

/// Element names the document renderer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagName {
    Paragraph,
    Heading(u8),
    Blockquote,
    OrderedList,
    UnorderedList,
    ListItem,
    Div,
    Anchor,
    Strong,
    Emphasis,
    Underline,
    Strikethrough,
    Code,
    Subscript,
    Superscript,
    LineBreak,
    HorizontalRule,
}

impl TagName {
    pub fn as_str(self) -> &'static str {
        match self {
            TagName::Paragraph => "p",
            TagName::Heading(1) => "h1",
            TagName::Heading(2) => "h2",
            TagName::Heading(4) => "h4",
            TagName::Heading(5) => "h5",
            TagName::Heading(6) => "h6",
            TagName::Heading(_) => "h3",
            TagName::Blockquote => "blockquote",
            TagName::OrderedList => "ol",
            TagName::UnorderedList => "ul",
            TagName::ListItem => "li",
            TagName::Div => "div",
            TagName::Anchor => "a",
            TagName::Strong => "strong",
            TagName::Emphasis => "em",
            TagName::Underline => "u",
            TagName::Strikethrough => "s",
            TagName::Code => "code",
            TagName::Subscript => "sub",
            TagName::Superscript => "sup",
            TagName::LineBreak => "br",
            TagName::HorizontalRule => "hr",
        }
    }

    /// Void elements have no closing tag and never hold children.
    pub fn is_void(self) -> bool {
        matches!(self, TagName::LineBreak | TagName::HorizontalRule)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagElement {
    pub name: TagName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Element>,
}

impl TagElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }
}

/// Presentational node. Text holds the raw payload; escaping happens on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Tag(TagElement),
    Text(String),
}

impl Element {
    pub fn tag(name: TagName, attributes: Vec<Attribute>, children: Vec<Element>) -> Self {
        Self::Tag(TagElement {
            name,
            attributes,
            children,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Ordered top-level elements produced from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    children: Vec<Element>,
}

impl Fragment {
    pub fn new(children: Vec<Element>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Serialise to markup. Text and attribute values are escaped here and
    /// nowhere else.
    pub fn to_html(&self) -> String {
        enum Step<'a> {
            Open(&'a Element),
            Close(TagName),
        }

        let mut html = String::new();
        let mut steps: Vec<Step<'_>> = self.children.iter().rev().map(Step::Open).collect();

        while let Some(step) = steps.pop() {
            match step {
                Step::Open(Element::Text(text)) => escape_into(&mut html, text),
                Step::Open(Element::Tag(tag)) => {
                    html.push('<');
                    html.push_str(tag.name.as_str());
                    for attribute in &tag.attributes {
                        html.push(' ');
                        html.push_str(attribute.name);
                        html.push_str("=\"");
                        escape_into(&mut html, &attribute.value);
                        html.push('"');
                    }
                    html.push('>');

                    if tag.name.is_void() {
                        continue;
                    }
                    steps.push(Step::Close(tag.name));
                    steps.extend(tag.children.iter().rev().map(Step::Open));
                }
                Step::Close(name) => {
                    html.push_str("</");
                    html.push_str(name.as_str());
                    html.push('>');
                }
            }
        }

        html
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

impl Drop for Fragment {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(element) = pending.pop() {
            if let Element::Tag(mut tag) = element {
                pending.append(&mut tag.children);
            }
        }
    }
}

/// Escape text for element content and double-quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    escape_into(&mut escaped, raw);
    escaped
}

fn escape_into(out: &mut String, raw: &str) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
}
