//! Shared types for the restaurant reviews client
//!
//! Data model used by the offline review outbox and the restaurant read path,
//! plus form validation and time helpers.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::ValidationError;
pub use models::{
    Favorite, LatLng, NewReview, OperatingHours, PendingReview, Restaurant, Review, ReviewForm,
};
pub use serde::{Deserialize, Serialize};
