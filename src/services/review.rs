//! Review access layer
//!
//! Reads reviews for a property together with their aggregate rating, and
//! validates every write before it reaches the gateway.

use crate::gateway::{Envelope, EnvelopeFailure, Filter, Query, RecordGateway, SortDirection};
use crate::models::{NewReview, Review, ReviewSummary, ReviewUpdate, SortOrder};
use crate::services::error::ReviewError;
use crate::services::notify::Notifier;
use crate::services::parse::{flag, int_or, text_or, timestamp_or_now};
use crate::services::validation::{validate_new_review, validate_review_update};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub const TABLE: &str = "review_c";
const PAGE_LIMIT: u32 = 50;

pub mod fields {
    pub const ID: &str = "Id";
    pub const NAME: &str = "Name";
    pub const PROPERTY_ID: &str = "property_id_c";
    pub const USER_ID: &str = "user_id_c";
    pub const USER_NAME: &str = "user_name_c";
    pub const USER_AVATAR: &str = "user_avatar_c";
    pub const RATING: &str = "rating_c";
    pub const TITLE: &str = "title_c";
    pub const COMMENT: &str = "comment_c";
    pub const DATE: &str = "date_c";
    pub const VERIFIED: &str = "verified_c";
    pub const HELPFUL: &str = "helpful_c";
}

use fields as f;

const REVIEW_FIELDS: &[&str] = &[
    f::NAME, f::PROPERTY_ID, f::USER_ID, f::USER_NAME, f::USER_AVATAR, f::RATING, f::TITLE,
    f::COMMENT, f::DATE, f::VERIFIED, f::HELPFUL,
];

pub const DEFAULT_AVATAR: &str =
    "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=100&h=100&fit=crop&crop=face";

impl From<SortOrder> for SortDirection {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => SortDirection::Asc,
            SortOrder::Desc => SortDirection::Desc,
        }
    }
}

pub struct ReviewService {
    gateway: Arc<dyn RecordGateway>,
    notifier: Arc<dyn Notifier>,
}

impl ReviewService {
    pub fn new(gateway: Arc<dyn RecordGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self { gateway, notifier }
    }

    /// Up to 50 reviews of a property, ordered by date. Any failure yields
    /// the empty summary.
    #[instrument(skip(self))]
    pub async fn get_by_property_id(&self, property_id: i64, order: SortOrder) -> ReviewSummary {
        let by_property = match Filter::equals(f::PROPERTY_ID, property_id) {
            Ok(filter) => filter,
            Err(e) => {
                warn!(error = %e, "Invalid review filter");
                return ReviewSummary::default();
            }
        };
        let query = Query::new()
            .select(REVIEW_FIELDS)
            .filter(by_property)
            .order_by(f::DATE, order.into())
            .page(PAGE_LIMIT, 0);

        match self.gateway.fetch_records(TABLE, &query).await {
            Ok(envelope) if envelope.success => {
                let reviews: Vec<Review> = envelope.records().iter().map(format_review).collect();
                let average_rating = average_rating(&reviews);
                debug!(count = reviews.len(), average_rating, "Fetched reviews");
                ReviewSummary {
                    total_count: reviews.len(),
                    average_rating,
                    reviews,
                }
            }
            Ok(envelope) => {
                error!(message = %envelope.failure_message(), "Review fetch rejected by gateway");
                ReviewSummary::default()
            }
            Err(e) => {
                error!(error = %e, "Error fetching reviews");
                ReviewSummary::default()
            }
        }
    }

    pub async fn get_reviews_summary(&self, property_id: i64) -> ReviewSummary {
        self.get_by_property_id(property_id, SortOrder::default())
            .await
    }

    #[instrument(skip(self, review))]
    pub async fn create(&self, review: &NewReview) -> Result<Review, ReviewError> {
        let checked = validate_new_review(review).map_err(|e| {
            debug!(reason = %e, "Review rejected by validation");
            e
        })?;

        let mut record = Map::new();
        let mut put = |field: &str, value: Value| {
            record.insert(field.to_string(), value);
        };
        put(f::NAME, format!("Review for Property {}", checked.property_id).into());
        put(f::PROPERTY_ID, checked.property_id.into());
        put(f::USER_ID, non_empty(&review.user_id).unwrap_or("guest").into());
        put(f::USER_NAME, non_empty(&review.user_name).unwrap_or("Guest User").into());
        put(f::USER_AVATAR, non_empty(&review.user_avatar).unwrap_or("").into());
        put(f::RATING, checked.rating.into());
        put(f::TITLE, non_empty(&review.title).unwrap_or("").into());
        put(f::COMMENT, checked.comment.into());
        put(f::DATE, Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true).into());
        put(f::VERIFIED, review.verified.unwrap_or(false).into());
        put(f::HELPFUL, 0_i64.into());
        let record = Value::Object(record);

        let response = self.gateway.create_record(TABLE, vec![record]).await;
        let created = format_review(&self.settle_write("create", response)?);
        info!(id = created.id, property_id = created.property_id, "Review created");
        Ok(created)
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id: i64, update: &ReviewUpdate) -> Result<Review, ReviewError> {
        validate_review_update(update).map_err(|e| {
            debug!(reason = %e, "Review update rejected by validation");
            e
        })?;

        let mut record = Map::new();
        record.insert(f::ID.to_string(), id.into());
        if let Some(rating) = update.rating {
            record.insert(f::RATING.to_string(), rating.into());
        }
        if let Some(title) = &update.title {
            record.insert(f::TITLE.to_string(), title.clone().into());
        }
        if let Some(comment) = &update.comment {
            record.insert(f::COMMENT.to_string(), comment.clone().into());
        }
        if let Some(verified) = update.verified {
            record.insert(f::VERIFIED.to_string(), verified.into());
        }
        if let Some(helpful) = update.helpful {
            record.insert(f::HELPFUL.to_string(), helpful.into());
        }

        let response = self
            .gateway
            .update_record(TABLE, vec![Value::Object(record)])
            .await;
        Ok(format_review(&self.settle_write("update", response)?))
    }

    /// Never fails; `false` when nothing was removed
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> bool {
        let envelope = match self.gateway.delete_record(TABLE, vec![id]).await {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(error = %e, "Error deleting review");
                return false;
            }
        };

        match envelope.settle() {
            Ok(outcome) => {
                if !outcome.failed.is_empty() {
                    error!(failed = outcome.failed.len(), "Failed to delete review");
                    for message in outcome.failure_messages() {
                        self.notifier.error(&message);
                    }
                }
                !outcome.succeeded.is_empty()
            }
            Err(EnvelopeFailure(message)) => {
                error!(%message, "Review delete rejected by gateway");
                self.notifier.error(&message);
                false
            }
        }
    }

    /// A write succeeds only if the envelope succeeded, no record in the
    /// batch failed, and one record came back.
    fn settle_write(
        &self,
        action: &'static str,
        response: anyhow::Result<Envelope>,
    ) -> Result<Value, ReviewError> {
        let envelope = response.map_err(|e| {
            error!(error = %e, "Error during review {}", action);
            ReviewError::Transport(e)
        })?;

        let outcome = envelope.settle().map_err(|EnvelopeFailure(message)| {
            error!(%message, "Review {} rejected by gateway", action);
            self.notifier.error(&message);
            ReviewError::Gateway(message)
        })?;

        if !outcome.failed.is_empty() {
            let messages = outcome.failure_messages();
            error!(failed = outcome.failed.len(), "Failed to {} review", action);
            for message in &messages {
                self.notifier.error(message);
            }
            return Err(ReviewError::RecordsRejected { action, messages });
        }

        outcome.first_success().ok_or(ReviewError::NoRecord(action))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Mean rating rounded to one decimal, halves away from zero; 0 when empty.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: i64 = reviews.iter().map(|r| r.rating).sum();
    let mean = sum as f64 / reviews.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Stored record to display model
pub fn format_review(record: &Value) -> Review {
    let get = |field: &str| record.get(field);

    Review {
        id: int_or(get(f::ID), 0),
        property_id: int_or(get(f::PROPERTY_ID), 0),
        user_id: text_or(get(f::USER_ID), "guest"),
        user_name: text_or(get(f::USER_NAME), "Guest User"),
        user_avatar: text_or(get(f::USER_AVATAR), DEFAULT_AVATAR),
        rating: int_or(get(f::RATING), 0),
        title: text_or(get(f::TITLE), ""),
        comment: text_or(get(f::COMMENT), ""),
        date: timestamp_or_now(get(f::DATE)),
        verified: flag(get(f::VERIFIED)),
        helpful: int_or(get(f::HELPFUL), 0).max(0),
    }
}
