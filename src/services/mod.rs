pub mod error;
pub mod notify;
pub mod parse;
pub mod property;
pub mod review;
pub mod validation;

pub use error::{ReviewError, ValidationError};
pub use notify::{LogNotifier, NoticeLevel, Notifier};
pub use property::PropertyService;
pub use review::{average_rating, ReviewService};
