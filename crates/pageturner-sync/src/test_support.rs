//! In-process fake of the bookstore backend for client tests.
//!
//! Tokens: `user-token` and `admin-token` are valid, anything else gets a
//! 401. Accounts: `ann@example.com` / `secret` (user) and
//! `admin@example.com` / `secret` (admin).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use pageturner_store::{Store, StoreHandle};

use crate::config::ClientConfig;
use crate::navigator::RecordingNavigator;
use crate::session::Session;

pub(crate) const USER_TOKEN: &str = "user-token";
pub(crate) const ADMIN_TOKEN: &str = "admin-token";

/// Listing shape served by `GET /books`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageShape {
    Items,
    Books,
    Bare,
}

/// One request as the fake saw it.
#[derive(Debug, Clone)]
pub(crate) struct Seen {
    pub method: String,
    pub path: String,
    pub token: Option<String>,
    pub x_auth: bool,
}

pub(crate) struct FakeState {
    pub shape: Mutex<PageShape>,
    pub cart: Mutex<Vec<Value>>,
    pub seen: Mutex<Vec<Seen>>,
}

pub(crate) struct FakeBackend {
    pub base_url: String,
    pub state: Arc<FakeState>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState {
            shape: Mutex::new(PageShape::Items),
            cart: Mutex::new(Vec::new()),
            seen: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/books", get(list_books).post(create_book))
            .route("/api/books/{id}", get(get_book).put(update_book).delete(delete_book))
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/me", get(me))
            .route("/api/auth/logout", post(logout))
            .route("/api/cart", get(get_cart))
            .route("/api/cart/count", get(cart_count))
            .route(
                "/api/cart/{id}",
                get(get_cart_item).put(put_cart_item).delete(delete_cart_item),
            )
            .route("/api/orders", get(orders))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeBackend {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    pub fn set_shape(&self, shape: PageShape) {
        *self.state.shape.lock().unwrap() = shape;
    }

    pub fn seed_cart(&self, items: Vec<Value>) {
        *self.state.cart.lock().unwrap() = items;
    }

    pub fn cart(&self) -> Vec<Value> {
        self.state.cart.lock().unwrap().clone()
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.seen.lock().unwrap().len()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::with_base_url(self.base_url.as_str())
    }

    /// A session on a fresh in-memory store.
    pub fn session(&self) -> (Session, RecordingNavigator) {
        session_with(self.config(), Store::in_memory().open_context())
    }
}

pub(crate) fn session_with(config: ClientConfig, handle: StoreHandle) -> (Session, RecordingNavigator) {
    let nav = RecordingNavigator::new();
    let session = Session::new(config, handle, Arc::new(nav.clone())).unwrap();
    (session, nav)
}

// =============================================================================
// Helpers
// =============================================================================

fn record(state: &FakeState, method: &str, path: &str, headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let x_auth = headers
        .get("x-auth-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let token = bearer.or_else(|| x_auth.clone());
    state.seen.lock().unwrap().push(Seen {
        method: method.to_string(),
        path: path.to_string(),
        token: token.clone(),
        x_auth: x_auth.is_some(),
    });
    token
}

fn authorize(token: Option<String>) -> Result<bool, Response> {
    match token.as_deref() {
        Some(USER_TOKEN) => Ok(false),
        Some(ADMIN_TOKEN) => Ok(true),
        _ => Err((StatusCode::UNAUTHORIZED, Json(json!({ "msg": "Token is not valid" }))).into_response()),
    }
}

fn book(id: &str, title: &str, price: f64) -> Value {
    json!({
        "_id": id,
        "title": title,
        "author": "Frank Herbert",
        "isbn": "9780441013593",
        "price": price,
        "stockQuantity": 5
    })
}

fn catalog() -> Vec<Value> {
    vec![book("b1", "Dune", 9.99), book("b2", "Dune Messiah", 12.5)]
}

// =============================================================================
// Books
// =============================================================================

async fn list_books(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "GET", "/books", &headers);
    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let shape = *state.shape.lock().unwrap();
    let body = match shape {
        PageShape::Items => json!({
            "items": catalog(),
            "currentPage": page,
            "totalPages": 3,
            "totalCount": 6
        }),
        PageShape::Books => json!({
            "books": catalog(),
            "currentPage": page,
            "totalPages": 1,
            "total": 2
        }),
        PageShape::Bare => json!(catalog()),
    };
    Json(body).into_response()
}

async fn get_book(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record(&state, "GET", &format!("/books/{id}"), &headers);
    match catalog().into_iter().find(|b| b["_id"] == id.as_str()) {
        Some(b) => Json(b).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "msg": "Book not found" }))).into_response(),
    }
}

async fn create_book(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(mut draft): Json<Value>,
) -> Response {
    let token = record(&state, "POST", "/books", &headers);
    match authorize(token) {
        Ok(true) => {
            draft["_id"] = json!("new-book");
            (StatusCode::CREATED, Json(draft)).into_response()
        }
        Ok(false) => (StatusCode::FORBIDDEN, Json(json!({ "msg": "Admin only" }))).into_response(),
        Err(resp) => resp,
    }
}

async fn update_book(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut draft): Json<Value>,
) -> Response {
    let token = record(&state, "PUT", &format!("/books/{id}"), &headers);
    match authorize(token) {
        Ok(_) => {
            draft["_id"] = json!(id);
            Json(draft).into_response()
        }
        Err(resp) => resp,
    }
}

async fn delete_book(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let token = record(&state, "DELETE", &format!("/books/{id}"), &headers);
    match authorize(token) {
        Ok(_) => Json(json!({ "msg": "Book removed" })).into_response(),
        Err(resp) => resp,
    }
}

// =============================================================================
// Auth
// =============================================================================

async fn login(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "POST", "/auth/login", &headers);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (email, password) {
        ("ann@example.com", "secret") => Json(json!({ "token": USER_TOKEN })).into_response(),
        ("admin@example.com", "secret") => Json(json!({ "token": ADMIN_TOKEN })).into_response(),
        ("stale@example.com", "secret") => Json(json!({ "token": "stale-token" })).into_response(),
        _ => (StatusCode::BAD_REQUEST, Json(json!({ "msg": "Invalid Credentials" }))).into_response(),
    }
}

async fn register(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "POST", "/auth/register", &headers);
    match body["email"].as_str().unwrap_or_default() {
        "taken@example.com" => {
            (StatusCode::BAD_REQUEST, Json(json!({ "msg": "User already exists" }))).into_response()
        }
        "notoken@example.com" => Json(json!({ "msg": "Registered" })).into_response(),
        _ => Json(json!({ "token": USER_TOKEN })).into_response(),
    }
}

async fn me(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    let token = record(&state, "GET", "/auth/me", &headers);
    match authorize(token) {
        Ok(is_admin) => Json(json!({
            "_id": "u1",
            "name": if is_admin { "Admin" } else { "Ann" },
            "email": "ann@example.com",
            "isAdmin": is_admin
        }))
        .into_response(),
        Err(resp) => resp,
    }
}

async fn logout(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    record(&state, "POST", "/auth/logout", &headers);
    Json(json!({})).into_response()
}

// =============================================================================
// Cart
// =============================================================================

async fn get_cart(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    let token = record(&state, "GET", "/cart", &headers);
    if let Err(resp) = authorize(token) {
        return resp;
    }
    Json(json!(state.cart.lock().unwrap().clone())).into_response()
}

async fn cart_count(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    let token = record(&state, "GET", "/cart/count", &headers);
    if let Err(resp) = authorize(token) {
        return resp;
    }
    let count = state.cart.lock().unwrap().len();
    Json(json!({ "count": count })).into_response()
}

async fn get_cart_item(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let token = record(&state, "GET", &format!("/cart/{id}"), &headers);
    if let Err(resp) = authorize(token) {
        return resp;
    }
    let cart = state.cart.lock().unwrap();
    match cart.iter().find(|i| i["_id"] == id.as_str()) {
        Some(item) => Json(item.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "msg": "Item not in cart" }))).into_response(),
    }
}

async fn put_cart_item(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let token = record(&state, "PUT", &format!("/cart/{id}"), &headers);
    if let Err(resp) = authorize(token) {
        return resp;
    }
    let quantity = body["quantity"].as_i64().unwrap_or(0);
    let mut cart = state.cart.lock().unwrap();
    match cart.iter_mut().find(|i| i["_id"] == id.as_str()) {
        Some(item) => item["quantity"] = json!(quantity),
        None => cart.push(json!({ "_id": id, "title": id, "price": 1.0, "quantity": quantity })),
    }
    Json(json!({ "msg": "Updated" })).into_response()
}

async fn delete_cart_item(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let token = record(&state, "DELETE", &format!("/cart/{id}"), &headers);
    if let Err(resp) = authorize(token) {
        return resp;
    }
    state.cart.lock().unwrap().retain(|i| i["_id"] != id.as_str());
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Orders
// =============================================================================

async fn orders(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    let token = record(&state, "GET", "/orders", &headers);
    if let Err(resp) = authorize(token) {
        return resp;
    }
    Json(json!([
        {
            "_id": "o1",
            "items": [{ "_id": "b1", "title": "Dune", "price": 9.99, "quantity": 1 }],
            "totalAmount": 9.99,
            "status": "Completed",
            "createdAt": "2024-01-02T10:00:00Z"
        },
        {
            "_id": "o2",
            "items": [{ "_id": "b2", "title": "Dune Messiah", "price": 12.5, "quantity": 2 }],
            "totalAmount": 25.0,
            "status": "Processing",
            "createdAt": "2024-03-04T10:00:00Z"
        }
    ]))
    .into_response()
}
