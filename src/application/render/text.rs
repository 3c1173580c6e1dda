use crate::domain::rich_text::{Document, Node};

const WORDS_PER_MINUTE: usize = 200;
const ELLIPSIS: char = '…';

/// Flatten a document into whitespace-normalised plain text. Block boundaries
/// become single spaces.
pub fn plain_text(document: &Document) -> String {
    let mut raw = String::new();
    let mut pending: Vec<&Node> = document.children().iter().rev().collect();

    while let Some(node) = pending.pop() {
        match node {
            Node::Text(run) => raw.push_str(&run.text),
            Node::LineBreak | Node::HorizontalRule => raw.push(' '),
            other => {
                if other.is_block() {
                    raw.push(' ');
                }
                pending.extend(other.children().iter().rev());
            }
        }
    }

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain-text excerpt of at most `max_chars` characters, cut at a word
/// boundary when one exists.
pub fn excerpt(document: &Document, max_chars: usize) -> String {
    let text = plain_text(document);
    if text.chars().count() <= max_chars {
        return text;
    }

    let budget = max_chars.saturating_sub(1);
    let cut: String = text.chars().take(budget).collect();
    let at_boundary = text.chars().nth(budget).is_some_and(char::is_whitespace);
    let trimmed = match cut.rfind(' ') {
        _ if at_boundary => cut.as_str(),
        Some(index) if index > 0 => &cut[..index],
        _ => cut.as_str(),
    };
    let mut excerpt = trimmed.trim_end_matches([',', ';', ':', '.']).to_string();
    excerpt.push(ELLIPSIS);
    excerpt
}

/// Estimated reading time in whole minutes; zero only for empty documents.
pub fn reading_time_minutes(document: &Document) -> u32 {
    let words = plain_text(document).split_whitespace().count();
    if words == 0 {
        return 0;
    }
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_value(&json!({
            "root": { "children": [
                { "type": "heading", "tag": "h2", "children": [{ "type": "text", "text": "Gentle care" }] },
                { "type": "paragraph", "children": [
                    { "type": "text", "text": "We take " },
                    { "type": "text", "text": "time", "format": 1 },
                    { "type": "text", "text": " for you." },
                    { "type": "linebreak" },
                    { "type": "text", "text": "Always." }
                ]},
                { "type": "list", "listType": "bullet", "children": [
                    { "type": "listitem", "children": [{ "type": "text", "text": "Implants" }] },
                    { "type": "listitem", "children": [{ "type": "text", "text": "Prophylaxis" }] }
                ]}
            ]}
        }))
    }

    #[test]
    fn plain_text_separates_blocks_and_keeps_inline_runs_together() {
        assert_eq!(
            plain_text(&sample()),
            "Gentle care We take time for you. Always. Implants Prophylaxis"
        );
    }

    #[test]
    fn excerpt_cuts_at_word_boundary() {
        assert_eq!(excerpt(&sample(), 20), "Gentle care We take…");
        assert_eq!(excerpt(&sample(), 200), plain_text(&sample()));
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(&Document::empty()), 0);
        assert_eq!(reading_time_minutes(&sample()), 1);

        let long = Document::new(vec![Node::Paragraph {
            children: vec![Node::text("word ".repeat(401))],
        }]);
        assert_eq!(reading_time_minutes(&long), 3);
    }
}
