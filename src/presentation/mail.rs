//! Mail bodies for contact form submissions.

use askama::Template;

#[derive(Template)]
#[template(path = "mail/contact.html")]
pub struct ContactMailHtml {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message_lines: Vec<String>,
}

#[derive(Template)]
#[template(path = "mail/contact.txt")]
pub struct ContactMailText {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message_lines: Vec<String>,
}
