use serde::{Deserialize, Serialize};

/// Coordinates of a listing; 0/0 when unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub country: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub nightly_rate: f64,
    pub cleaning_fee: f64,
    pub service_fee: f64,
    pub currency: String,
}

/// Guest capacity; every field is at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub beds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub join_date: String,
    pub verified: bool,
}

/// Stay length bounds in nights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub min_stay: u32,
    pub max_stay: u32,
}

/// Rental listing as shown to guests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub location: Location,
    pub pricing: Pricing,
    pub capacity: Capacity,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    /// 0-5, one decimal
    pub rating: f64,
    pub review_count: u32,
    pub host: Host,
    pub availability: Availability,
}

/// Fields accepted when listing a new property
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub nightly_rate: Option<f64>,
    pub cleaning_fee: Option<f64>,
    pub service_fee: Option<f64>,
    pub currency: Option<String>,
    pub guests: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub beds: Option<u32>,
    pub host_name: Option<String>,
    pub host_verified: Option<bool>,
}

/// Partial property edit; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub nightly_rate: Option<f64>,
    pub cleaning_fee: Option<f64>,
    pub service_fee: Option<f64>,
    pub currency: Option<String>,
    pub guests: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub beds: Option<u32>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Guest-facing search form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Matched against city, country and title
    pub location: Option<String>,
    pub guests: Option<u32>,
    pub price_range: Option<PriceRange>,
}
