//! Restaurant Model (read path)

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::util::lenient_millis;

/// Filter value that disables cuisine/neighborhood filtering
pub const ALL: &str = "all";

/// Image shown for restaurants without a photograph
pub const DEFAULT_IMAGE_URL: &str = "img/default.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Opening hours per weekday, as free text (e.g. "5:30 pm - 11:00 pm")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    #[serde(rename = "Monday", default)]
    pub monday: Option<String>,
    #[serde(rename = "Tuesday", default)]
    pub tuesday: Option<String>,
    #[serde(rename = "Wednesday", default)]
    pub wednesday: Option<String>,
    #[serde(rename = "Thursday", default)]
    pub thursday: Option<String>,
    #[serde(rename = "Friday", default)]
    pub friday: Option<String>,
    #[serde(rename = "Saturday", default)]
    pub saturday: Option<String>,
    #[serde(rename = "Sunday", default)]
    pub sunday: Option<String>,
}

impl OperatingHours {
    /// Rows of the hours table, Monday first; days without an entry are skipped
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        [
            ("Monday", &self.monday),
            ("Tuesday", &self.tuesday),
            ("Wednesday", &self.wednesday),
            ("Thursday", &self.thursday),
            ("Friday", &self.friday),
            ("Saturday", &self.saturday),
            ("Sunday", &self.sunday),
        ]
        .into_iter()
        .filter_map(|(day, hours)| hours.as_deref().map(|h| (day, h)))
        .collect()
    }
}

/// Favorite flag. The API encodes it as the strings `"true"` / `"false"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Favorite {
    Yes,
    #[default]
    No,
}

impl Favorite {
    pub fn is_favorite(self) -> bool {
        self == Favorite::Yes
    }

    pub fn toggled(self) -> Self {
        match self {
            Favorite::Yes => Favorite::No,
            Favorite::No => Favorite::Yes,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Favorite::Yes => "true",
            Favorite::No => "false",
        }
    }
}

impl From<bool> for Favorite {
    fn from(value: bool) -> Self {
        if value { Favorite::Yes } else { Favorite::No }
    }
}

impl Serialize for Favorite {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Favorite {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(b.into()),
            Raw::Text(s) => match s.as_str() {
                "true" => Ok(Favorite::Yes),
                "false" | "" => Ok(Favorite::No),
                other => Err(serde::de::Error::custom(format!(
                    "invalid favorite flag: {other}"
                ))),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub photograph: Option<serde_json::Value>,
    #[serde(default)]
    pub address: String,
    pub latlng: Option<LatLng>,
    #[serde(default)]
    pub cuisine_type: String,
    #[serde(default)]
    pub operating_hours: Option<OperatingHours>,
    #[serde(rename = "createdAt", default, with = "lenient_millis")]
    pub created_at: Option<i64>,
    #[serde(rename = "updatedAt", default, with = "lenient_millis")]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub is_favorite: Favorite,
}

impl Restaurant {
    /// Relative URL of the detail page
    pub fn detail_url(&self) -> String {
        format!("./restaurant.html?id={}", self.id)
    }

    /// Path of the restaurant photo, or [`DEFAULT_IMAGE_URL`]
    pub fn image_url(&self) -> String {
        match &self.photograph {
            Some(serde_json::Value::String(name)) if !name.is_empty() => format!("/img/{name}.jpg"),
            Some(serde_json::Value::Number(n)) if n.as_f64() != Some(0.0) => format!("/img/{n}.jpg"),
            _ => DEFAULT_IMAGE_URL.to_string(),
        }
    }
}

/// Keep restaurants matching both filters; [`ALL`] disables a filter.
pub fn filter_restaurants(
    restaurants: Vec<Restaurant>,
    cuisine: &str,
    neighborhood: &str,
) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|r| cuisine == ALL || r.cuisine_type == cuisine)
        .filter(|r| neighborhood == ALL || r.neighborhood == neighborhood)
        .collect()
}

/// Distinct neighborhoods, first-seen order
pub fn neighborhoods(restaurants: &[Restaurant]) -> Vec<String> {
    distinct(restaurants.iter().map(|r| r.neighborhood.as_str()))
}

/// Distinct cuisines, first-seen order
pub fn cuisines(restaurants: &[Restaurant]) -> Vec<String> {
    distinct(restaurants.iter().map(|r| r.cuisine_type.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}
