//! Application services: rendering, content shaping and the contact mailer.

pub mod chrome;
pub mod contact;
pub mod content;
pub mod error;
pub mod mail;
pub mod render;
pub mod repos;
