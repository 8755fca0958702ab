//! Application state for the rendering layer
//!
//! Holds what the pages read repeatedly: the restaurant list, the currently
//! opened restaurant and the active filter. Owned by the caller and passed
//! around explicitly.

use shared::models::restaurant::{self, ALL};
use shared::models::{Favorite, Restaurant};
use tokio::sync::{Mutex, RwLock};

use crate::restaurants::RestaurantApi;
use crate::ClientResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub cuisine: String,
    pub neighborhood: String,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            cuisine: ALL.to_string(),
            neighborhood: ALL.to_string(),
        }
    }
}

#[derive(Default)]
pub struct AppState {
    restaurants: RwLock<Option<Vec<Restaurant>>>,
    /// Held across the fetch so concurrent callers share one request
    current: Mutex<Option<Restaurant>>,
    filter: RwLock<Filter>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restaurant list, fetched on first use
    pub async fn restaurants(&self, api: &RestaurantApi) -> ClientResult<Vec<Restaurant>> {
        if let Some(cached) = self.restaurants.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut slot = self.restaurants.write().await;
        if let Some(cached) = slot.as_ref() {
            return Ok(cached.clone());
        }
        let fetched = api.fetch_restaurants().await?;
        tracing::debug!(count = fetched.len(), "Restaurant list cached");
        *slot = Some(fetched.clone());
        Ok(fetched)
    }

    pub async fn set_filter(&self, cuisine: impl Into<String>, neighborhood: impl Into<String>) {
        *self.filter.write().await = Filter {
            cuisine: cuisine.into(),
            neighborhood: neighborhood.into(),
        };
    }

    pub async fn filter(&self) -> Filter {
        self.filter.read().await.clone()
    }

    /// Cached list narrowed by the active filter
    pub async fn filtered_restaurants(&self, api: &RestaurantApi) -> ClientResult<Vec<Restaurant>> {
        let all = self.restaurants(api).await?;
        let filter = self.filter().await;
        Ok(restaurant::filter_restaurants(
            all,
            &filter.cuisine,
            &filter.neighborhood,
        ))
    }

    /// The opened restaurant, fetched once per id
    pub async fn current_restaurant(&self, api: &RestaurantApi, id: i64) -> ClientResult<Restaurant> {
        let mut current = self.current.lock().await;
        if let Some(r) = current.as_ref().filter(|r| r.id == id) {
            return Ok(r.clone());
        }
        let fetched = api.fetch_restaurant_by_id(id).await?;
        *current = Some(fetched.clone());
        Ok(fetched)
    }

    /// Flip the opened restaurant's favorite flag and persist it.
    ///
    /// Returns `None` when no restaurant is open. On API failure the cached
    /// flag is restored and the error returned.
    pub async fn toggle_favorite(&self, api: &RestaurantApi) -> ClientResult<Option<Favorite>> {
        let mut current = self.current.lock().await;
        let Some(restaurant) = current.as_mut() else {
            return Ok(None);
        };

        let previous = restaurant.is_favorite;
        let next = previous.toggled();
        restaurant.is_favorite = next;

        if let Err(e) = api.set_favorite(restaurant.id, next).await {
            restaurant.is_favorite = previous;
            return Err(e);
        }
        self.update_cached(restaurant).await;
        Ok(Some(next))
    }

    async fn update_cached(&self, updated: &Restaurant) {
        if let Some(list) = self.restaurants.write().await.as_mut()
            && let Some(slot) = list.iter_mut().find(|r| r.id == updated.id)
        {
            slot.is_favorite = updated.is_favorite;
        }
    }

    /// Drop all cached data
    pub async fn invalidate(&self) {
        *self.restaurants.write().await = None;
        *self.current.lock().await = None;
    }
}
