//! Integration tests for the Beach Stall client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p beachstall-integration-tests
//! ```
//!
//! No external services are needed: each test starts a [`FakeBackend`], an
//! axum server on an ephemeral local port that speaks the stall's REST API,
//! and drives the real `reqwest` client against it.
//!
//! # Test Categories
//!
//! - `session_flow` - Login, session restore and logout
//! - `cart_flow` - Cart replace-on-response and failure handling
//! - `checkout_flow` - Order placement, totals and bookings
//! - `catalog` - Menu loading, caching and order history

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use beachstall_client::{ClientConfig, HttpApi};
use serde_json::{Value, json};
use url::Url;

pub const EMAIL: &str = "asha@example.com";
pub const PASSWORD: &str = "correct horse";
pub const TOKEN: &str = "jwt-asha";

type Failure = (StatusCode, Json<Value>);
type Reply = Result<Json<Value>, Failure>;

#[derive(Default)]
struct BackendState {
    carts: HashMap<String, Vec<Value>>,
    products: Vec<Value>,
    orders: Vec<Value>,
    bookings: Vec<Value>,
    requests: Vec<String>,
    role: Option<String>,
    failures: HashMap<String, (StatusCode, Option<String>)>,
}

/// In-process stand-in for the stall's REST API.
#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
    base_url: Url,
}

impl FakeBackend {
    /// Bind to `127.0.0.1:0` and serve until the test runtime shuts down.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(BackendState::default()));

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/cart", get(get_cart))
            .route("/api/cart/add", post(add_to_cart))
            .route("/api/cart/remove/{product_id}", delete(remove_from_cart))
            .route("/api/orders/create", post(create_order))
            .route("/api/orders/myorders", get(my_orders))
            .route("/api/product/getProducts", get(products))
            .route("/api/bookings", post(create_booking))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: Url::parse(&format!("http://{addr}/api/")).unwrap(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Client configuration pointing at this backend.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_api(self.base_url.as_str()).unwrap()
    }

    #[must_use]
    pub fn api(&self) -> HttpApi {
        HttpApi::with_client(reqwest::Client::new(), self.base_url.clone())
    }

    /// Replace the product list.
    pub fn set_products(&self, products: Vec<Value>) {
        self.lock().products = products;
    }

    /// Replace the registered user's server-side cart.
    pub fn set_cart(&self, items: Vec<Value>) {
        self.lock().carts.insert(TOKEN.to_string(), items);
    }

    /// Role string returned by `/auth/me` (default `"user"`).
    pub fn set_role(&self, role: &str) {
        self.lock().role = Some(role.to_string());
    }

    #[must_use]
    pub fn cart(&self) -> Vec<Value> {
        self.lock().carts.get(TOKEN).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.lock().orders.clone()
    }

    #[must_use]
    pub fn bookings(&self) -> Vec<Value> {
        self.lock().bookings.clone()
    }

    /// Make requests to `route` (e.g. `"POST /cart/add"`) fail.
    pub fn fail(&self, route: &str, status: u16, message: Option<&str>) {
        self.lock().failures.insert(
            route.to_string(),
            (
                StatusCode::from_u16(status).unwrap(),
                message.map(String::from),
            ),
        );
    }

    pub fn recover(&self, route: &str) {
        self.lock().failures.remove(route);
    }

    /// Number of requests received for `route` (e.g. `"GET /cart"`).
    #[must_use]
    pub fn requests(&self, route: &str) -> usize {
        self.lock().requests.iter().filter(|r| *r == route).count()
    }

    /// Total number of requests received.
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.lock().requests.len()
    }
}

/// A product document as the server stores it.
#[must_use]
pub fn product(id: &str, name: &str, price: f64, category: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "price": price,
        "image": format!("uploads\\{id}.jpg"),
        "category": category,
        "description": format!("{name} from the stall kitchen"),
        "__v": 0
    })
}

/// A cart line as the server stores it.
#[must_use]
pub fn cart_item(product_id: &str, name: &str, price: f64, quantity: i64) -> Value {
    json!({
        "_id": format!("line-{product_id}"),
        "productId": product_id,
        "name": name,
        "price": price,
        "image": format!("uploads/{product_id}.jpg"),
        "quantity": quantity
    })
}

// =============================================================================
// Handlers
// =============================================================================

fn error(status: StatusCode, message: Option<&str>) -> Failure {
    let body = message.map_or_else(|| json!({}), |m| json!({ "message": m }));
    (status, Json(body))
}

/// Record the request and return the injected failure, if any.
fn enter(state: &Mutex<BackendState>, route: &str) -> Result<(), Failure> {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    state.requests.push(route.to_string());
    match state.failures.get(route) {
        Some((status, message)) => Err(error(*status, message.as_deref())),
        None => Ok(()),
    }
}

fn authorize(headers: &HeaderMap) -> Result<String, Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(TOKEN) => Ok(TOKEN.to_string()),
        Some(_) => Err(error(
            StatusCode::UNAUTHORIZED,
            Some("Not authorized, token failed"),
        )),
        None => Err(error(
            StatusCode::UNAUTHORIZED,
            Some("Not authorized, no token"),
        )),
    }
}

fn cart_body(items: &[Value]) -> Json<Value> {
    Json(json!({ "_id": "cart-1", "user": "u-asha", "items": items }))
}

async fn login(State(state): State<Arc<Mutex<BackendState>>>, Json(body): Json<Value>) -> Reply {
    enter(&state, "POST /auth/login")?;
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        Ok(Json(json!({ "_id": "u-asha", "name": "Asha", "token": TOKEN })))
    } else {
        Err(error(StatusCode::UNAUTHORIZED, Some("Invalid credentials")))
    }
}

async fn me(State(state): State<Arc<Mutex<BackendState>>>, headers: HeaderMap) -> Reply {
    enter(&state, "GET /auth/me")?;
    authorize(&headers)?;
    let role = state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .role
        .clone()
        .unwrap_or_else(|| "user".to_string());
    Ok(Json(json!({
        "_id": "u-asha",
        "name": "Asha",
        "email": EMAIL,
        "role": role,
        "createdAt": "2026-01-10T08:00:00.000Z"
    })))
}

async fn get_cart(State(state): State<Arc<Mutex<BackendState>>>, headers: HeaderMap) -> Reply {
    enter(&state, "GET /cart")?;
    let token = authorize(&headers)?;
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    match state.carts.get(&token) {
        Some(items) => Ok(cart_body(items)),
        // Users who never added anything have no cart document
        None => Ok(Json(json!({}))),
    }
}

async fn add_to_cart(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    enter(&state, "POST /cart/add")?;
    let token = authorize(&headers)?;

    let Some(product_id) = body["productId"].as_str().map(String::from) else {
        return Err(error(StatusCode::BAD_REQUEST, Some("productId is required")));
    };
    let delta = body["quantity"].as_i64().unwrap_or(1);

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let items = state.carts.entry(token).or_default();
    if let Some(index) = items.iter().position(|i| i["productId"] == product_id) {
        let quantity = items[index]["quantity"].as_i64().unwrap_or(0) + delta;
        if quantity <= 0 {
            items.remove(index);
        } else {
            items[index]["quantity"] = json!(quantity);
        }
    } else if delta > 0 {
        let mut item = body.clone();
        item["_id"] = json!(format!("line-{product_id}"));
        items.push(item);
    }
    Ok(cart_body(items))
}

async fn remove_from_cart(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Reply {
    enter(&state, "DELETE /cart/remove")?;
    let token = authorize(&headers)?;
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let items = state.carts.entry(token).or_default();
    items.retain(|i| i["productId"] != product_id);
    Ok(cart_body(items))
}

async fn create_order(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    enter(&state, "POST /orders/create")?;
    authorize(&headers)?;

    let has_items = body["orderItems"].as_array().is_some_and(|i| !i.is_empty());
    if !has_items {
        return Err(error(StatusCode::BAD_REQUEST, Some("No order items")));
    }

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let mut order = body;
    order["_id"] = json!(format!("order-{}", state.orders.len() + 1));
    order["user"] = json!("u-asha");
    order["status"] = json!("Pending");
    order["createdAt"] = json!(chrono::Utc::now().to_rfc3339());
    state.orders.push(order.clone());
    Ok(Json(order))
}

async fn my_orders(State(state): State<Arc<Mutex<BackendState>>>, headers: HeaderMap) -> Reply {
    enter(&state, "GET /orders/myorders")?;
    authorize(&headers)?;
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(Json(Value::Array(state.orders.iter().rev().cloned().collect())))
}

async fn products(State(state): State<Arc<Mutex<BackendState>>>) -> Reply {
    enter(&state, "GET /product/getProducts")?;
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(Json(Value::Array(state.products.clone())))
}

async fn create_booking(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    enter(&state, "POST /bookings")?;
    authorize(&headers)?;
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let mut booking = body;
    booking["_id"] = json!(format!("booking-{}", state.bookings.len() + 1));
    booking["status"] = json!("Pending");
    state.bookings.push(booking.clone());
    Ok(Json(json!({ "success": true, "booking": booking })))
}
