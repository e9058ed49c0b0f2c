//! Review write errors

use thiserror::Error;

/// Rule violated by a review write; raised before any gateway call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Property ID, rating, and comment are required")]
    MissingRequired,
    #[error("Rating must be between 1 and 5 stars")]
    RatingOutOfRange(i64),
    #[error("Review comment must be at least 10 characters long")]
    CommentTooShort(usize),
    #[error("Review comment must be at most 1000 characters")]
    CommentTooLong(usize),
    #[error("Helpful count must not be negative")]
    NegativeHelpful(i64),
    #[error("Review update has no fields to change")]
    NoChanges,
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Envelope-level rejection, with the gateway's message
    #[error("{0}")]
    Gateway(String),

    /// Envelope succeeded but records in the batch failed
    #[error("Failed to {action} review{}", joined(.messages))]
    RecordsRejected {
        action: &'static str,
        messages: Vec<String>,
    },

    #[error("Failed to {0} review")]
    NoRecord(&'static str),

    #[error("Record gateway unavailable: {0:#}")]
    Transport(anyhow::Error),
}

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        Self::Transport(err)
    }
}

fn joined(messages: &[String]) -> String {
    if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    }
}

impl ReviewError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
