//! Remote review gateway
//!
//! The flusher only needs "create this review remotely"; the trait keeps the
//! HTTP details out of the outbox and lets tests script gateway behavior.

use async_trait::async_trait;
use shared::models::{NewReview, Review};

use crate::{ClientResult, HttpClient};

const REVIEWS_PATH: &str = "reviews/";

#[async_trait]
pub trait ReviewGateway: Send + Sync {
    /// Create the review remotely.
    ///
    /// `Ok` means the gateway acknowledged creation. The confirmed record is
    /// returned when the gateway sends one back.
    async fn create_review(&self, review: &NewReview) -> ClientResult<Option<Review>>;
}

/// Gateway posting reviews as url-encoded forms to `{base}/reviews/`
#[derive(Debug, Clone)]
pub struct HttpReviewGateway {
    http: HttpClient,
}

impl HttpReviewGateway {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReviewGateway for HttpReviewGateway {
    async fn create_review(&self, review: &NewReview) -> ClientResult<Option<Review>> {
        let fields = review.form_fields();
        let response = self.http.post_form(REVIEWS_PATH, fields.as_slice()).await?;

        // The status already confirmed creation; a body we cannot read must
        // not turn an accepted review into a retry.
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Review accepted but response body unreadable");
                return Ok(None);
            }
        };
        if bytes.is_empty() {
            return Ok(None);
        }

        match serde_json::from_slice::<Review>(&bytes) {
            Ok(confirmed) => Ok(Some(confirmed)),
            Err(e) => {
                tracing::warn!(error = %e, "Review accepted with unexpected response body");
                Ok(None)
            }
        }
    }
}
