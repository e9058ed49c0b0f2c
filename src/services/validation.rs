//! Review write rules shared by the access layer and the review form

use crate::models::{NewReview, ReviewUpdate};
use crate::services::error::ValidationError;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
pub const MIN_COMMENT_CHARS: usize = 10;
pub const MAX_COMMENT_CHARS: usize = 1000;

/// Fields of a new review that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedReview<'a> {
    pub property_id: i64,
    pub rating: i64,
    pub comment: &'a str,
}

pub fn validate_rating(rating: i64) -> Result<(), ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

/// Length is counted in characters, not bytes
pub fn validate_comment(comment: &str) -> Result<(), ValidationError> {
    let len = comment.chars().count();
    if len < MIN_COMMENT_CHARS {
        Err(ValidationError::CommentTooShort(len))
    } else if len > MAX_COMMENT_CHARS {
        Err(ValidationError::CommentTooLong(len))
    } else {
        Ok(())
    }
}

/// Presence first, then rating range, then comment length. A zero
/// property id or rating counts as missing.
pub fn validate_new_review(review: &NewReview) -> Result<CheckedReview<'_>, ValidationError> {
    let property_id = review.property_id.filter(|id| *id != 0);
    let rating = review.rating.filter(|r| *r != 0);
    let comment = review.comment.as_deref().filter(|c| !c.is_empty());

    let (Some(property_id), Some(rating), Some(comment)) = (property_id, rating, comment) else {
        return Err(ValidationError::MissingRequired);
    };

    validate_rating(rating)?;
    validate_comment(comment)?;

    Ok(CheckedReview {
        property_id,
        rating,
        comment,
    })
}

/// Checks only the fields present in the update; an update with none is
/// rejected
pub fn validate_review_update(update: &ReviewUpdate) -> Result<(), ValidationError> {
    if update.rating.is_none()
        && update.title.is_none()
        && update.comment.is_none()
        && update.verified.is_none()
        && update.helpful.is_none()
    {
        return Err(ValidationError::NoChanges);
    }
    if let Some(rating) = update.rating {
        validate_rating(rating)?;
    }
    if let Some(comment) = update.comment.as_deref() {
        validate_comment(comment)?;
    }
    if let Some(helpful) = update.helpful {
        if helpful < 0 {
            return Err(ValidationError::NegativeHelpful(helpful));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(rating: i64, comment: &str) -> NewReview {
        NewReview {
            property_id: Some(7),
            rating: Some(rating),
            comment: Some(comment.to_string()),
            ..NewReview::default()
        }
    }

    #[test]
    fn test_rating_bounds() {
        for rating in 1..=5 {
            assert!(validate_rating(rating).is_ok());
        }
        assert_eq!(validate_rating(6), Err(ValidationError::RatingOutOfRange(6)));
        assert_eq!(validate_rating(-1), Err(ValidationError::RatingOutOfRange(-1)));
    }

    #[test]
    fn test_comment_bounds() {
        assert_eq!(validate_comment("short"), Err(ValidationError::CommentTooShort(5)));
        assert!(validate_comment(&"a".repeat(10)).is_ok());
        assert!(validate_comment(&"a".repeat(1000)).is_ok());
        assert_eq!(
            validate_comment(&"a".repeat(1001)),
            Err(ValidationError::CommentTooLong(1001))
        );
        // 10 characters, 20 bytes
        assert!(validate_comment(&"é".repeat(10)).is_ok());
    }

    #[test]
    fn test_missing_fields_reported_first() {
        assert_eq!(
            validate_new_review(&NewReview::default()),
            Err(ValidationError::MissingRequired)
        );
        assert_eq!(
            validate_new_review(&draft(0, "A lovely quiet flat")),
            Err(ValidationError::MissingRequired)
        );
        assert_eq!(
            validate_new_review(&NewReview { property_id: Some(0), ..draft(4, "A lovely quiet flat") }),
            Err(ValidationError::MissingRequired)
        );
        assert_eq!(
            validate_new_review(&draft(4, "")),
            Err(ValidationError::MissingRequired)
        );
    }

    #[test]
    fn test_rating_checked_before_comment() {
        assert_eq!(
            validate_new_review(&draft(9, "short")),
            Err(ValidationError::RatingOutOfRange(9))
        );
    }

    #[test]
    fn test_valid_review_passes() {
        let review = draft(5, "Spotless and central");
        let checked = validate_new_review(&review).unwrap();
        assert_eq!(checked.property_id, 7);
        assert_eq!(checked.rating, 5);
        assert_eq!(checked.comment, "Spotless and central");
    }

    #[test]
    fn test_update_checks_only_present_fields() {
        assert_eq!(
            validate_review_update(&ReviewUpdate::default()),
            Err(ValidationError::NoChanges)
        );
        assert!(validate_review_update(&ReviewUpdate { verified: Some(false), ..ReviewUpdate::default() }).is_ok());
        assert!(validate_review_update(&ReviewUpdate { helpful: Some(3), ..ReviewUpdate::default() }).is_ok());
        assert_eq!(
            validate_review_update(&ReviewUpdate {
                comment: Some("short".to_string()),
                ..ReviewUpdate::default()
            }),
            Err(ValidationError::CommentTooShort(5))
        );
        assert_eq!(
            validate_review_update(&ReviewUpdate { helpful: Some(-2), ..ReviewUpdate::default() }),
            Err(ValidationError::NegativeHelpful(-2))
        );
    }
}
