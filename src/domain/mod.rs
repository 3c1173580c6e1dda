//! Domain layer types and invariants.

pub mod entities;
pub mod error;
pub mod rich_text;
pub mod slug;
