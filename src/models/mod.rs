mod property;
mod review;

pub use property::{
    Availability, Capacity, Coordinates, Host, Location, NewProperty, PriceRange, Pricing, Property,
    PropertyUpdate, SearchCriteria,
};
pub use review::{NewReview, Review, ReviewSummary, ReviewUpdate, SortOrder};
