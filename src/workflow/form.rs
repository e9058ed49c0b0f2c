//! Client-side review form state

use crate::models::NewReview;
use crate::services::validation::{MAX_COMMENT_CHARS, MIN_COMMENT_CHARS};
use crate::workflow::rating::{StarRating, Stars};

const MAX_TITLE_CHARS: usize = 100;

/// Identity attached to a submitted review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
}

/// Per-field messages shown next to the inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub rating: Option<String>,
    pub comment: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ReviewForm {
    property_id: i64,
    rating: StarRating,
    title: String,
    comment: String,
    errors: FieldErrors,
}

impl ReviewForm {
    pub fn new(property_id: i64) -> Self {
        Self {
            property_id,
            rating: StarRating::default(),
            title: String::new(),
            comment: String::new(),
            errors: FieldErrors::default(),
        }
    }

    pub fn rating(&self) -> &StarRating {
        &self.rating
    }

    pub fn hover_star(&mut self, stars: Stars) {
        self.rating.hover(stars);
    }

    pub fn leave_stars(&mut self) {
        self.rating.leave();
    }

    pub fn select_rating(&mut self, stars: Stars) {
        self.rating.select(stars);
        self.errors.rating = None;
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.chars().take(MAX_TITLE_CHARS).collect();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_comment(&mut self, comment: &str) {
        self.comment = comment.to_string();
        self.errors.comment = None;
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn comment_counter(&self) -> String {
        format!("{}/{}", self.comment.chars().count(), MAX_COMMENT_CHARS)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Same limits as the review service, checked on the trimmed comment
    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::default();

        if self.rating.committed().is_none() {
            errors.rating = Some("Please select a rating".to_string());
        }

        let len = self.comment.trim().chars().count();
        if len < MIN_COMMENT_CHARS {
            errors.comment = Some(format!(
                "Review must be at least {} characters long",
                MIN_COMMENT_CHARS
            ));
        } else if len > MAX_COMMENT_CHARS {
            errors.comment = Some(format!(
                "Review must be less than {} characters",
                MAX_COMMENT_CHARS
            ));
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    pub fn to_new_review(&self, author: &Author) -> NewReview {
        NewReview {
            property_id: Some(self.property_id),
            rating: self.rating.committed().map(|s| i64::from(s.get())),
            title: Some(self.title.trim().to_string()),
            comment: Some(self.comment.trim().to_string()),
            user_id: Some(author.user_id.clone()),
            user_name: Some(author.user_name.clone()),
            user_avatar: Some(author.user_avatar.clone()),
            verified: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author {
            user_id: "current-user".to_string(),
            user_name: String::new(),
            user_avatar: String::new(),
        }
    }

    #[test]
    fn test_empty_form_reports_both_fields() {
        let mut form = ReviewForm::new(7);
        assert!(!form.validate());
        assert_eq!(form.errors().rating.as_deref(), Some("Please select a rating"));
        assert_eq!(
            form.errors().comment.as_deref(),
            Some("Review must be at least 10 characters long")
        );
    }

    #[test]
    fn test_comment_is_trimmed_before_counting() {
        let mut form = ReviewForm::new(7);
        form.select_rating(Stars::new(5).unwrap());
        form.set_comment("   nine chr   ");
        assert!(!form.validate());

        form.set_comment(&"y".repeat(1001));
        assert!(!form.validate());
        assert_eq!(
            form.errors().comment.as_deref(),
            Some("Review must be less than 1000 characters")
        );

        form.set_comment("  Lovely host and a great view  ");
        assert!(form.validate());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_edits_clear_field_errors() {
        let mut form = ReviewForm::new(7);
        form.validate();

        form.select_rating(Stars::new(3).unwrap());
        assert!(form.errors().rating.is_none());
        assert!(form.errors().comment.is_some());

        form.set_comment("x");
        assert!(form.errors().comment.is_none());
    }

    #[test]
    fn test_hover_alone_does_not_satisfy_rating() {
        let mut form = ReviewForm::new(7);
        form.hover_star(Stars::new(4).unwrap());
        form.set_comment("Cosy place near the beach");
        assert!(!form.validate());
        assert!(form.errors().rating.is_some());

        form.select_rating(Stars::new(2).unwrap());
        form.hover_star(Stars::new(5).unwrap());
        form.leave_stars();
        assert_eq!(form.rating().display_value(), Stars::new(2));
        assert!(form.validate());
    }

    #[test]
    fn test_title_limit_and_counter() {
        let mut form = ReviewForm::new(7);
        form.set_title(&"t".repeat(150));
        assert_eq!(form.title().chars().count(), 100);

        form.set_comment("héllo");
        assert_eq!(form.comment_counter(), "5/1000");
    }

    #[test]
    fn test_builds_trimmed_review() {
        let mut form = ReviewForm::new(7);
        form.select_rating(Stars::new(4).unwrap());
        form.set_title("  Great  ");
        form.set_comment("  Would stay again next summer  ");

        let review = form.to_new_review(&author());
        assert_eq!(review.property_id, Some(7));
        assert_eq!(review.rating, Some(4));
        assert_eq!(review.title.as_deref(), Some("Great"));
        assert_eq!(review.comment.as_deref(), Some("Would stay again next summer"));
        assert_eq!(review.user_id.as_deref(), Some("current-user"));
    }
}
