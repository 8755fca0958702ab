//! Data models

pub mod restaurant;
pub mod review;

pub use restaurant::{Favorite, LatLng, OperatingHours, Restaurant};
pub use review::{NewReview, PendingReview, Review, ReviewForm};
