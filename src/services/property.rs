//! Property access layer
//!
//! Builds gateway queries for listing, search and detail views, whitelists
//! writes into storage field names, and normalizes stored records into
//! [`Property`] display models.

use crate::gateway::{
    BatchOutcome, Envelope, EnvelopeFailure, Filter, Query, QueryError, RecordGateway,
    SortDirection,
};
use crate::models::{
    Availability, Capacity, Coordinates, Host, Location, NewProperty, Pricing, Property,
    PropertyUpdate, SearchCriteria,
};
use crate::services::notify::Notifier;
use crate::services::parse::{
    bounded_float_or, count_or, flag, float_or, int_or, non_negative_float_or, positive_int_or,
    text_or,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub const TABLE: &str = "property_c";
const PAGE_LIMIT: u32 = 50;

/// Storage field names of the property table
pub mod fields {
    pub const ID: &str = "Id";
    pub const NAME: &str = "Name";
    pub const TITLE: &str = "title_c";
    pub const DESCRIPTION: &str = "description_c";
    pub const PROPERTY_TYPE: &str = "property_type_c";
    pub const CITY: &str = "city_c";
    pub const COUNTRY: &str = "country_c";
    pub const ADDRESS: &str = "address_c";
    pub const LAT: &str = "lat_c";
    pub const LNG: &str = "lng_c";
    pub const NIGHTLY_RATE: &str = "nightly_rate_c";
    pub const CLEANING_FEE: &str = "cleaning_fee_c";
    pub const SERVICE_FEE: &str = "service_fee_c";
    pub const CURRENCY: &str = "currency_c";
    pub const GUESTS: &str = "guests_c";
    pub const BEDROOMS: &str = "bedrooms_c";
    pub const BATHROOMS: &str = "bathrooms_c";
    pub const BEDS: &str = "beds_c";
    pub const RATING: &str = "rating_c";
    pub const REVIEW_COUNT: &str = "review_count_c";
    pub const HOST_ID: &str = "host_id_c";
    pub const HOST_NAME: &str = "host_name_c";
    pub const HOST_AVATAR: &str = "host_avatar_c";
    pub const HOST_VERIFIED: &str = "host_verified_c";
    pub const JOIN_DATE: &str = "join_date_c";
    pub const AVAILABILITY: &str = "availability_c";
    pub const MIN_STAY: &str = "min_stay_c";
    pub const MAX_STAY: &str = "max_stay_c";
}

use fields as f;

const LIST_FIELDS: &[&str] = &[
    f::NAME, f::TITLE, f::PROPERTY_TYPE, f::CITY, f::COUNTRY, f::ADDRESS, f::NIGHTLY_RATE,
    f::CLEANING_FEE, f::SERVICE_FEE, f::CURRENCY, f::GUESTS, f::BEDROOMS, f::BATHROOMS, f::BEDS,
    f::RATING, f::REVIEW_COUNT, f::HOST_NAME, f::HOST_AVATAR, f::HOST_VERIFIED, f::JOIN_DATE,
    f::DESCRIPTION, f::AVAILABILITY, f::MIN_STAY, f::MAX_STAY,
];

const DETAIL_FIELDS: &[&str] = &[
    f::NAME, f::TITLE, f::DESCRIPTION, f::PROPERTY_TYPE, f::CITY, f::COUNTRY, f::ADDRESS, f::LAT,
    f::LNG, f::NIGHTLY_RATE, f::CLEANING_FEE, f::SERVICE_FEE, f::CURRENCY, f::GUESTS, f::BEDROOMS,
    f::BATHROOMS, f::BEDS, f::RATING, f::REVIEW_COUNT, f::HOST_NAME, f::HOST_AVATAR,
    f::HOST_VERIFIED, f::HOST_ID, f::JOIN_DATE, f::AVAILABILITY, f::MIN_STAY, f::MAX_STAY,
];

const SEARCH_FIELDS: &[&str] = &[
    f::NAME, f::TITLE, f::PROPERTY_TYPE, f::CITY, f::COUNTRY, f::ADDRESS, f::NIGHTLY_RATE,
    f::CLEANING_FEE, f::SERVICE_FEE, f::GUESTS, f::BEDROOMS, f::BATHROOMS, f::RATING,
    f::REVIEW_COUNT,
];

const DEFAULT_IMAGES: &[&str] = &[
    "https://images.unsplash.com/photo-1560448204-e02f11c3d0e2?w=800&h=600&fit=crop",
    "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?w=800&h=600&fit=crop",
    "https://images.unsplash.com/photo-1556909114-f6e7ad7d3136?w=800&h=600&fit=crop",
    "https://images.unsplash.com/photo-1484154218962-a197022b5858?w=800&h=600&fit=crop",
    "https://images.unsplash.com/photo-1515263487990-61b07816b00a?w=800&h=600&fit=crop",
];

const DEFAULT_AMENITIES: &[&str] = &["WiFi", "Air conditioning", "Kitchen", "Washer", "TV", "Parking"];

const DEFAULT_HOST_AVATAR: &str =
    "https://images.unsplash.com/photo-1494790108755-2616b612b789?w=100&h=100&fit=crop&crop=face";

pub struct PropertyService {
    gateway: Arc<dyn RecordGateway>,
    notifier: Arc<dyn Notifier>,
}

impl PropertyService {
    pub fn new(gateway: Arc<dyn RecordGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self { gateway, notifier }
    }

    /// Newest 50 listings. Failures yield an empty list.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<Property> {
        let query = Query::new()
            .select(LIST_FIELDS)
            .order_by(f::ID, SortDirection::Desc)
            .page(PAGE_LIMIT, 0);

        match self.gateway.fetch_records(TABLE, &query).await {
            Ok(envelope) if envelope.success => {
                let properties: Vec<Property> =
                    envelope.records().iter().map(format_property).collect();
                debug!(count = properties.len(), "Fetched properties");
                properties
            }
            Ok(envelope) => {
                let message = envelope.failure_message();
                error!(%message, "Property listing rejected by gateway");
                self.notifier.error(&message);
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Error fetching properties");
                self.notifier.error("Failed to load properties");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Option<Property> {
        match self.gateway.get_record_by_id(TABLE, id, DETAIL_FIELDS).await {
            Ok(envelope) if envelope.success => envelope
                .data
                .filter(Value::is_object)
                .map(|record| format_property(&record)),
            Ok(envelope) => {
                debug!(id, message = %envelope.failure_message(), "Property not found");
                None
            }
            Err(e) => {
                error!(id, error = %e, "Error fetching property");
                None
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn search(&self, criteria: &SearchCriteria) -> Vec<Property> {
        let query = match search_query(criteria) {
            Ok(query) => query,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid search criteria");
                return Vec::new();
            }
        };

        match self.gateway.fetch_records(TABLE, &query).await {
            Ok(envelope) if envelope.success => {
                envelope.records().iter().map(format_property).collect()
            }
            Ok(envelope) => {
                error!(message = %envelope.failure_message(), "Property search rejected by gateway");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Error searching properties");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, data))]
    pub async fn create(&self, data: &NewProperty) -> Option<Property> {
        let response = self
            .gateway
            .create_record(TABLE, vec![create_record(data)])
            .await;
        let created = self.settle_write("create", response)?.first_success()?;
        let property = format_property(&created);
        info!(id = property.id, "Property created");
        Some(property)
    }

    #[instrument(skip(self, updates))]
    pub async fn update(&self, id: i64, updates: &PropertyUpdate) -> Option<Property> {
        let response = self
            .gateway
            .update_record(TABLE, vec![update_record(id, updates)])
            .await;
        let updated = self.settle_write("update", response)?.first_success()?;
        Some(format_property(&updated))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> bool {
        let response = self.gateway.delete_record(TABLE, vec![id]).await;
        self.settle_write("delete", response)
            .map(|outcome| !outcome.succeeded.is_empty())
            .unwrap_or(false)
    }

    /// Log and surface failures at both levels; `None` when the envelope
    /// itself failed or never arrived.
    fn settle_write(
        &self,
        action: &str,
        response: anyhow::Result<Envelope>,
    ) -> Option<BatchOutcome> {
        let envelope = match response {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(error = %e, "Error during property {}", action);
                return None;
            }
        };

        match envelope.settle() {
            Ok(outcome) => {
                if !outcome.failed.is_empty() {
                    error!(failed = outcome.failed.len(), "Failed to {} property", action);
                    for message in outcome.failure_messages() {
                        self.notifier.error(&message);
                    }
                }
                Some(outcome)
            }
            Err(EnvelopeFailure(message)) => {
                error!(%message, "Property {} rejected by gateway", action);
                self.notifier.error(&message);
                None
            }
        }
    }
}

/// Location matches any of city, country or title; guests filter only
/// above 1; each price bound only when positive.
pub fn search_query(criteria: &SearchCriteria) -> Result<Query, QueryError> {
    let mut query = Query::new().select(SEARCH_FIELDS).page(PAGE_LIMIT, 0);

    if let Some(location) = criteria
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        query = query.any_of(vec![
            Filter::contains(f::CITY, location)?,
            Filter::contains(f::COUNTRY, location)?,
            Filter::contains(f::TITLE, location)?,
        ]);
    }

    if let Some(guests) = criteria.guests.filter(|g| *g > 1) {
        query = query.filter(Filter::at_least(f::GUESTS, f64::from(guests))?);
    }

    if let Some(range) = criteria.price_range {
        let min = Some(range.min).filter(|m| *m > 0.0);
        let max = Some(range.max).filter(|m| *m > 0.0);
        if min.is_some() || max.is_some() {
            query = query.filter(Filter::range(f::NIGHTLY_RATE, min, max)?);
        }
    }

    Ok(query)
}

fn put<T: Into<Value>>(record: &mut Map<String, Value>, field: &str, value: Option<T>) {
    if let Some(value) = value {
        record.insert(field.to_string(), value.into());
    }
}

/// Writes `value` only when it passes `valid`; rejected values leave the
/// stored field untouched.
fn put_checked<T>(
    record: &mut Map<String, Value>,
    field: &str,
    value: Option<T>,
    valid: impl Fn(&T) -> bool,
) where
    T: Into<Value> + std::fmt::Debug,
{
    match value {
        Some(value) if valid(&value) => {
            record.insert(field.to_string(), value.into());
        }
        Some(value) => warn!(field, ?value, "Dropping out-of-range property update"),
        None => {}
    }
}

fn is_amount(value: &f64) -> bool {
    value.is_finite() && *value >= 0.0
}

fn is_capacity(value: &u32) -> bool {
    *value >= 1
}

fn is_rating(value: &f64) -> bool {
    value.is_finite() && (0.0..=5.0).contains(value)
}

fn amount(value: Option<f64>) -> f64 {
    value.filter(is_amount).unwrap_or(0.0)
}

fn at_least_one(value: Option<u32>) -> u32 {
    value.filter(is_capacity).unwrap_or(1)
}

fn create_record(data: &NewProperty) -> Value {
    let mut record = Map::new();
    let name = data
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "New Property".to_string());
    record.insert(f::NAME.to_string(), name.into());
    put(&mut record, f::TITLE, data.title.clone());
    put(&mut record, f::DESCRIPTION, data.description.clone());
    put(&mut record, f::PROPERTY_TYPE, data.property_type.clone());
    put(&mut record, f::CITY, data.city.clone());
    put(&mut record, f::COUNTRY, data.country.clone());
    put(&mut record, f::ADDRESS, data.address.clone());
    put(&mut record, f::NIGHTLY_RATE, Some(amount(data.nightly_rate)));
    put(&mut record, f::CLEANING_FEE, Some(amount(data.cleaning_fee)));
    put(&mut record, f::SERVICE_FEE, Some(amount(data.service_fee)));
    put(
        &mut record,
        f::CURRENCY,
        Some(data.currency.clone().unwrap_or_else(|| "USD".to_string())),
    );
    put(&mut record, f::GUESTS, Some(at_least_one(data.guests)));
    put(&mut record, f::BEDROOMS, Some(at_least_one(data.bedrooms)));
    put(&mut record, f::BATHROOMS, Some(at_least_one(data.bathrooms)));
    put(&mut record, f::BEDS, Some(at_least_one(data.beds)));
    put(
        &mut record,
        f::HOST_NAME,
        Some(data.host_name.clone().unwrap_or_else(|| "Host".to_string())),
    );
    put(&mut record, f::HOST_VERIFIED, Some(data.host_verified.unwrap_or(false)));
    put(&mut record, f::RATING, Some(0_u32));
    put(&mut record, f::REVIEW_COUNT, Some(0_u32));
    Value::Object(record)
}

fn update_record(id: i64, updates: &PropertyUpdate) -> Value {
    let mut record = Map::new();
    record.insert(f::ID.to_string(), id.into());
    put(&mut record, f::TITLE, updates.title.clone());
    put(&mut record, f::DESCRIPTION, updates.description.clone());
    put(&mut record, f::PROPERTY_TYPE, updates.property_type.clone());
    put_checked(&mut record, f::NIGHTLY_RATE, updates.nightly_rate, is_amount);
    put_checked(&mut record, f::CLEANING_FEE, updates.cleaning_fee, is_amount);
    put_checked(&mut record, f::SERVICE_FEE, updates.service_fee, is_amount);
    put(&mut record, f::CURRENCY, updates.currency.clone());
    put_checked(&mut record, f::GUESTS, updates.guests, is_capacity);
    put_checked(&mut record, f::BEDROOMS, updates.bedrooms, is_capacity);
    put_checked(&mut record, f::BATHROOMS, updates.bathrooms, is_capacity);
    put_checked(&mut record, f::BEDS, updates.beds, is_capacity);
    put_checked(&mut record, f::RATING, updates.rating, is_rating);
    put(&mut record, f::REVIEW_COUNT, updates.review_count);
    Value::Object(record)
}

/// Stored record to display model. Every optional field has a default.
pub fn format_property(record: &Value) -> Property {
    let get = |field: &str| record.get(field);
    let rating = bounded_float_or(get(f::RATING), 0.0, 5.0, 0.0);

    Property {
        id: int_or(get(f::ID), 0),
        title: text_or(get(f::TITLE), &text_or(get(f::NAME), "")),
        description: text_or(get(f::DESCRIPTION), ""),
        property_type: text_or(get(f::PROPERTY_TYPE), ""),
        location: Location {
            address: text_or(get(f::ADDRESS), ""),
            city: text_or(get(f::CITY), ""),
            country: text_or(get(f::COUNTRY), ""),
            coordinates: Coordinates {
                lat: float_or(get(f::LAT), 0.0),
                lng: float_or(get(f::LNG), 0.0),
            },
        },
        pricing: Pricing {
            nightly_rate: non_negative_float_or(get(f::NIGHTLY_RATE), 0.0),
            cleaning_fee: non_negative_float_or(get(f::CLEANING_FEE), 0.0),
            service_fee: non_negative_float_or(get(f::SERVICE_FEE), 0.0),
            currency: text_or(get(f::CURRENCY), "USD"),
        },
        capacity: Capacity {
            guests: positive_int_or(get(f::GUESTS), 1),
            bedrooms: positive_int_or(get(f::BEDROOMS), 1),
            bathrooms: positive_int_or(get(f::BATHROOMS), 1),
            beds: positive_int_or(get(f::BEDS), 1),
        },
        images: DEFAULT_IMAGES.iter().map(|s| (*s).to_string()).collect(),
        amenities: DEFAULT_AMENITIES.iter().map(|s| (*s).to_string()).collect(),
        rating: (rating * 10.0).round() / 10.0,
        review_count: count_or(get(f::REVIEW_COUNT), 0),
        host: Host {
            id: text_or(get(f::HOST_ID), "host1"),
            name: text_or(get(f::HOST_NAME), "Host"),
            avatar: text_or(get(f::HOST_AVATAR), DEFAULT_HOST_AVATAR),
            join_date: text_or(get(f::JOIN_DATE), "Recently"),
            verified: flag(get(f::HOST_VERIFIED)),
        },
        availability: Availability {
            min_stay: positive_int_or(get(f::MIN_STAY), 1),
            max_stay: positive_int_or(get(f::MAX_STAY), 30),
        },
    }
}
