pub mod form;
pub mod rating;
pub mod section;

pub use form::{Author, FieldErrors, ReviewForm};
pub use rating::{StarRating, Stars};
pub use section::{ReviewsSection, SubmissionPhase, SubmitOutcome};
