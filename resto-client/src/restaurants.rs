//! Restaurant read path
//!
//! Thin wrappers over the restaurant/review endpoints. Filtering happens on
//! the client, over the full restaurant list.

use shared::models::restaurant::{self, ALL};
use shared::models::{Favorite, Restaurant, Review};

use crate::{ClientResult, HttpClient};

#[derive(Debug, Clone)]
pub struct RestaurantApi {
    http: HttpClient,
}

impl RestaurantApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn fetch_restaurants(&self) -> ClientResult<Vec<Restaurant>> {
        self.http.get("restaurants").await
    }

    pub async fn fetch_restaurant_by_id(&self, id: i64) -> ClientResult<Restaurant> {
        self.http.get(&format!("restaurants/{id}")).await
    }

    pub async fn fetch_reviews_by_restaurant_id(&self, id: i64) -> ClientResult<Vec<Review>> {
        self.http
            .get_with_query("reviews/", &[("restaurant_id", id)])
            .await
    }

    /// Persist the favorite flag; returns the updated restaurant
    pub async fn set_favorite(&self, id: i64, favorite: Favorite) -> ClientResult<Restaurant> {
        self.http
            .put_query(
                &format!("restaurants/{id}/"),
                &[("is_favorite", favorite.as_str())],
            )
            .await
    }

    /// `"all"` matches every restaurant here too, unlike a literal
    /// `cuisine_type == cuisine` comparison
    pub async fn fetch_restaurants_by_cuisine(&self, cuisine: &str) -> ClientResult<Vec<Restaurant>> {
        self.fetch_restaurants_by_cuisine_and_neighborhood(cuisine, ALL)
            .await
    }

    /// `"all"` matches every restaurant, as in [`Self::fetch_restaurants_by_cuisine`]
    pub async fn fetch_restaurants_by_neighborhood(
        &self,
        neighborhood: &str,
    ) -> ClientResult<Vec<Restaurant>> {
        self.fetch_restaurants_by_cuisine_and_neighborhood(ALL, neighborhood)
            .await
    }

    /// `"all"` disables the corresponding filter
    pub async fn fetch_restaurants_by_cuisine_and_neighborhood(
        &self,
        cuisine: &str,
        neighborhood: &str,
    ) -> ClientResult<Vec<Restaurant>> {
        let restaurants = self.fetch_restaurants().await?;
        Ok(restaurant::filter_restaurants(
            restaurants,
            cuisine,
            neighborhood,
        ))
    }

    pub async fn fetch_neighborhoods(&self) -> ClientResult<Vec<String>> {
        Ok(restaurant::neighborhoods(&self.fetch_restaurants().await?))
    }

    pub async fn fetch_cuisines(&self) -> ClientResult<Vec<String>> {
        Ok(restaurant::cuisines(&self.fetch_restaurants().await?))
    }
}

/// Relative URL of a restaurant's detail page
pub fn url_for_restaurant(restaurant: &Restaurant) -> String {
    restaurant.detail_url()
}

/// Photo path of a restaurant, falling back to the default image
pub fn image_url_for_restaurant(restaurant: &Restaurant) -> String {
    restaurant.image_url()
}
