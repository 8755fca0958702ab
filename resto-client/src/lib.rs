//! Restaurant reviews client
//!
//! Offline-capable review submission plus the restaurant read path.
//!
//! ```text
//! ReviewOutbox ── submit ──▶ ReviewQueue (redb) ◀── Flusher ──▶ ReviewGateway (HTTP)
//!                                                     ▲
//!                              ConnectivityTrigger ───┘  (startup, reconnect)
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod logger;
pub mod outbox;
pub mod queue;
pub mod restaurants;
pub mod state;

pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use gateway::{HttpReviewGateway, ReviewGateway};
pub use http::HttpClient;
pub use outbox::{
    Connectivity, ConnectivityProbe, ConnectivityTrigger, FlushReport, Flusher, OutboxError,
    ReviewOutbox,
};
pub use queue::{QueueError, QueueResult, ReviewQueue};
pub use restaurants::RestaurantApi;
pub use state::AppState;

// Re-export shared types for convenience
pub use shared::models::{NewReview, PendingReview, Restaurant, Review, ReviewForm};
