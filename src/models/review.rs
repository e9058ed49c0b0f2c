use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Guest review of a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub property_id: i64,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    /// 1-5 stars; 0 when the stored value is unreadable
    pub rating: i64,
    pub title: String,
    pub comment: String,
    pub date: DateTime<Utc>,
    pub verified: bool,
    pub helpful: i64,
}

/// Reviews of one property with their aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub reviews: Vec<Review>,
    pub total_count: usize,
    pub average_rating: f64,
}

/// Review ordering by date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub property_id: Option<i64>,
    pub rating: Option<i64>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_avatar: Option<String>,
    pub verified: Option<bool>,
}

/// Partial review edit; only `Some` fields are validated and written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub rating: Option<i64>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub verified: Option<bool>,
    pub helpful: Option<i64>,
}
