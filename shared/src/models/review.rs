//! Review Model
//!
//! A review goes through three shapes:
//!
//! ```text
//! ReviewForm ──validate──▶ NewReview ──enqueue──▶ PendingReview ──gateway──▶ Review
//!  (raw input)           (timestamped)         (local queue id)         (server id)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::util::{lenient_millis, now_millis};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_COMMENTS_LEN: usize = 5000;

/// Raw review form input, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewForm {
    pub restaurant_id: i64,
    pub name: String,
    pub rating: i64,
    pub comments: String,
}

impl ReviewForm {
    pub fn new(
        restaurant_id: i64,
        name: impl Into<String>,
        rating: i64,
        comments: impl Into<String>,
    ) -> Self {
        Self {
            restaurant_id,
            name: name.into(),
            rating,
            comments: comments.into(),
        }
    }

    /// Build a form from submitted `name=value` pairs.
    ///
    /// Unknown fields are ignored. `restaurant_id` and `rating` must parse as
    /// integers.
    pub fn from_fields<I, K, V>(fields: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut restaurant_id = None;
        let mut rating = None;
        let mut name = String::new();
        let mut comments = String::new();

        for (key, value) in fields {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "restaurant_id" => restaurant_id = Some(parse_int("restaurant_id", value)?),
                "rating" => rating = Some(parse_int("rating", value)?),
                "name" => name = value.to_string(),
                "comments" => comments = value.to_string(),
                _ => {}
            }
        }

        Ok(Self {
            restaurant_id: restaurant_id.ok_or(ValidationError::MissingField("restaurant_id"))?,
            name,
            rating: rating.ok_or(ValidationError::MissingField("rating"))?,
            comments,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.restaurant_id <= 0 {
            return Err(ValidationError::InvalidField {
                field: "restaurant_id",
                value: self.restaurant_id.to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }
        if self.rating < MIN_RATING as i64 || self.rating > MAX_RATING as i64 {
            return Err(ValidationError::RatingOutOfRange {
                min: MIN_RATING,
                max: MAX_RATING,
                got: self.rating,
            });
        }
        if self.comments.chars().count() > MAX_COMMENTS_LEN {
            return Err(ValidationError::TooLong {
                field: "comments",
                max: MAX_COMMENTS_LEN,
            });
        }
        Ok(())
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    value.parse().map_err(|_| ValidationError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// A validated review that has not been assigned any identifier yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub restaurant_id: i64,
    pub name: String,
    pub rating: u8,
    pub comments: String,
    /// Unix millis
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Unix millis
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl NewReview {
    /// Validate a form and stamp it with the current time
    pub fn from_form(form: ReviewForm) -> Result<Self, ValidationError> {
        form.validate()?;
        let now = now_millis();
        Ok(Self {
            restaurant_id: form.restaurant_id,
            name: form.name.trim().to_string(),
            // range checked by validate()
            rating: form.rating as u8,
            comments: form.comments.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Fields sent to the review gateway
    pub fn form_fields(&self) -> [(&'static str, String); 4] {
        [
            ("restaurant_id", self.restaurant_id.to_string()),
            ("name", self.name.clone()),
            ("rating", self.rating.to_string()),
            ("comments", self.comments.clone()),
        ]
    }
}

/// A review waiting in the local queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    /// Queue-assigned id, strictly increasing in insertion order
    pub id: u64,
    #[serde(flatten)]
    pub review: NewReview,
}

/// A review confirmed by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub rating: u8,
    #[serde(default)]
    pub comments: String,
    #[serde(rename = "createdAt", default, with = "lenient_millis")]
    pub created_at: Option<i64>,
    #[serde(rename = "updatedAt", default, with = "lenient_millis")]
    pub updated_at: Option<i64>,
}
