use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("`{0}` is not a valid slug")]
    InvalidSlug(String),
}
