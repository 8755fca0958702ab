//! In-process stand-in for the restaurant/review API

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Form, Json, Router};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct MockApi {
    /// When false every review POST answers 503
    pub available: AtomicBool,
    /// Author names answered with 503 even when available
    pub unavailable_for: Mutex<HashSet<String>>,
    /// Author names answered with 400
    pub reject: Mutex<HashSet<String>>,
    pub review_posts: AtomicUsize,
    pub restaurant_gets: AtomicUsize,
    pub stored_reviews: Mutex<Vec<Value>>,
    pub favorites: Mutex<HashMap<i64, bool>>,
}

impl MockApi {
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn stored_names(&self) -> Vec<String> {
        self.stored_reviews
            .lock()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn posts(&self) -> usize {
        self.review_posts.load(Ordering::SeqCst)
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub api: Arc<MockApi>,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

pub async fn spawn_server() -> TestServer {
    let api = Arc::new(MockApi::default());
    api.set_available(true);

    let app = Router::new()
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/{id}", get(get_restaurant))
        .route("/restaurants/{id}/", put(set_favorite))
        .route("/reviews/", get(list_reviews).post(create_review))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { addr, api }
}

/// Address nothing listens on
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..300 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

fn restaurants(api: &MockApi) -> Vec<Value> {
    let favorites = api.favorites.lock().unwrap();
    let fav = |id: i64| favorites.get(&id).copied().unwrap_or(false).to_string();
    vec![
        json!({
            "id": 1,
            "name": "Mission Chinese Food",
            "neighborhood": "Manhattan",
            "photograph": 1,
            "address": "171 E Broadway, New York, NY 10002",
            "latlng": { "lat": 40.713829, "lng": -73.989667 },
            "cuisine_type": "Asian",
            "operating_hours": { "Monday": "5:30 pm - 11:00 pm" },
            "is_favorite": fav(1)
        }),
        json!({
            "id": 2,
            "name": "Emily",
            "neighborhood": "Brooklyn",
            "address": "919 Fulton St, Brooklyn, NY 11238",
            "latlng": { "lat": 40.683555, "lng": -73.966393 },
            "cuisine_type": "Pizza",
            "is_favorite": fav(2)
        }),
        json!({
            "id": 3,
            "name": "Kang Ho Dong Baekjeong",
            "neighborhood": "Manhattan",
            "address": "1 E 32nd St, New York, NY 10016",
            "latlng": { "lat": 40.747143, "lng": -73.985414 },
            "cuisine_type": "Asian",
            "is_favorite": fav(3)
        }),
    ]
}

async fn list_restaurants(State(api): State<Arc<MockApi>>) -> Json<Vec<Value>> {
    Json(restaurants(&api))
}

async fn get_restaurant(State(api): State<Arc<MockApi>>, Path(id): Path<i64>) -> Response {
    api.restaurant_gets.fetch_add(1, Ordering::SeqCst);
    match restaurants(&api).into_iter().find(|r| r["id"] == id) {
        Some(r) => Json(r).into_response(),
        None => (StatusCode::NOT_FOUND, "no such restaurant").into_response(),
    }
}

async fn set_favorite(
    State(api): State<Arc<MockApi>>,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let Some(flag) = query.get("is_favorite") else {
        return (StatusCode::BAD_REQUEST, "is_favorite missing").into_response();
    };
    api.favorites.lock().unwrap().insert(id, flag == "true");
    match restaurants(&api).into_iter().find(|r| r["id"] == id) {
        Some(r) => Json(r).into_response(),
        None => (StatusCode::NOT_FOUND, "no such restaurant").into_response(),
    }
}

async fn list_reviews(
    State(api): State<Arc<MockApi>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let restaurant_id: Option<i64> = query.get("restaurant_id").and_then(|v| v.parse().ok());
    let reviews = api
        .stored_reviews
        .lock()
        .unwrap()
        .iter()
        .filter(|r| restaurant_id.is_none_or(|id| r["restaurant_id"] == id))
        .cloned()
        .collect();
    Json(reviews)
}

async fn create_review(
    State(api): State<Arc<MockApi>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    api.review_posts.fetch_add(1, Ordering::SeqCst);
    let name = form.get("name").cloned().unwrap_or_default();

    if !api.available.load(Ordering::SeqCst) || api.unavailable_for.lock().unwrap().contains(&name)
    {
        return (StatusCode::SERVICE_UNAVAILABLE, "gateway down").into_response();
    }
    if api.reject.lock().unwrap().contains(&name) {
        return (StatusCode::BAD_REQUEST, "rejected").into_response();
    }

    let parse = |key: &str| form.get(key).and_then(|v| v.parse::<i64>().ok());
    let (Some(restaurant_id), Some(rating)) = (parse("restaurant_id"), parse("rating")) else {
        return (StatusCode::BAD_REQUEST, "restaurant_id and rating required").into_response();
    };

    let mut stored = api.stored_reviews.lock().unwrap();
    let review = json!({
        "id": stored.len() as i64 + 1,
        "restaurant_id": restaurant_id,
        "name": name,
        "rating": rating,
        "comments": form.get("comments").cloned().unwrap_or_default(),
        "createdAt": 1_700_000_000_000i64,
        "updatedAt": "2023-11-14T22:13:20.000Z"
    });
    stored.push(review.clone());
    (StatusCode::CREATED, Json(review)).into_response()
}
