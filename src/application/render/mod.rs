//! Rich-document rendering.
//!
//! The renderer is pure: it reads a [`Document`](crate::domain::rich_text::Document)
//! and produces either a presentational element tree ([`Fragment`]) or the
//! equivalent markup string. It never fails, never logs and keeps no state
//! between calls.

mod document;
mod text;
mod tree;

pub use document::{render, render_html};
pub use text::{excerpt, plain_text, reading_time_minutes};
pub use tree::{Attribute, Element, Fragment, TagElement, TagName, escape_html};
