//! Website backend for a dental practice: editor-authored rich-text content
//! rendered to HTML, a contact mailer and an optional access gate.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
