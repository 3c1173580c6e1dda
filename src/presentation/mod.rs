pub mod mail;
pub mod views;
