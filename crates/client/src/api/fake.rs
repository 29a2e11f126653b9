//! In-memory [`StallApi`] used by the store unit tests.
//!
//! Mirrors the server's cart semantics (deltas merge into an existing line,
//! lines at zero are dropped) and records every call so tests can assert
//! what did and did not reach the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use beachstall_core::{
    CartLine, CartLineInput, NewBooking, NewOrder, Order, OrderId, OrderStatus, Price, Product,
    ProductId, UserId, UserProfile, UserRole,
};
use secrecy::ExposeSecret;
use tokio::sync::Notify;

use super::{ApiError, Credentials, LoginResponse, StallApi};
use crate::token::AuthToken;

pub const TEST_EMAIL: &str = "asha@example.com";
pub const TEST_PASSWORD: &str = "correct horse";
pub const TEST_TOKEN: &str = "token-asha";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Me,
    GetCart,
    AddToCart,
    RemoveFromCart,
    CreateOrder,
    MyOrders,
    Products,
    CreateBooking,
}

/// Pauses cart mutations and order creation until released.
#[derive(Debug, Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Debug, Default)]
struct FakeState {
    accounts: HashMap<String, (String, String)>,
    profiles: HashMap<String, UserProfile>,
    carts: HashMap<String, Vec<CartLine>>,
    products: Vec<Product>,
    orders: Vec<NewOrder>,
    history: Vec<Order>,
    bookings: Vec<NewBooking>,
    failures: HashMap<Endpoint, (u16, Option<String>)>,
    calls: HashMap<Endpoint, usize>,
    omit_order_id: bool,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
    gate: Mutex<Option<Arc<Gate>>>,
}

pub fn product(id: &str, name: &str, rupees: i64, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::rupees(rupees),
        image: format!("uploads\\{id}.jpg"),
        category: category.to_string(),
        description: None,
    }
}

impl FakeApi {
    /// A backend with one registered user and an empty cart.
    pub fn new() -> Self {
        let api = Self::default();
        {
            let mut state = api.lock();
            state.accounts.insert(
                TEST_EMAIL.to_string(),
                (TEST_PASSWORD.to_string(), TEST_TOKEN.to_string()),
            );
            state.profiles.insert(
                TEST_TOKEN.to_string(),
                UserProfile {
                    id: UserId::new("u-asha"),
                    name: "Asha".to_string(),
                    email: TEST_EMAIL.parse().ok(),
                    role: UserRole::User,
                },
            );
        }
        api
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn token() -> AuthToken {
        AuthToken::new(TEST_TOKEN)
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.lock().products = products;
        self
    }

    pub fn with_cart(self, lines: Vec<CartLine>) -> Self {
        self.lock().carts.insert(TEST_TOKEN.to_string(), lines);
        self
    }

    pub fn with_history(self, orders: Vec<Order>) -> Self {
        self.lock().history = orders;
        self
    }

    /// Make every call to `endpoint` fail with `status`.
    pub fn fail(&self, endpoint: Endpoint, status: u16, message: Option<&str>) {
        self.lock()
            .failures
            .insert(endpoint, (status, message.map(String::from)));
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.lock().failures.remove(&endpoint);
    }

    /// Answer order creation without an `_id`.
    pub fn omit_order_id(&self) {
        self.lock().omit_order_id = true;
    }

    pub fn hold(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = Some(gate.clone());
        gate
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.lock().calls.get(&endpoint).copied().unwrap_or(0)
    }

    pub fn server_cart(&self) -> Vec<CartLine> {
        self.lock().carts.get(TEST_TOKEN).cloned().unwrap_or_default()
    }

    pub fn placed_orders(&self) -> Vec<NewOrder> {
        self.lock().orders.clone()
    }

    pub fn bookings(&self) -> Vec<NewBooking> {
        self.lock().bookings.clone()
    }

    /// Count the call and return the injected failure, if any.
    fn enter(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        let mut state = self.lock();
        *state.calls.entry(endpoint).or_default() += 1;
        match state.failures.get(&endpoint) {
            Some((status, message)) => Err(ApiError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn authorize(&self, token: &AuthToken) -> Result<String, ApiError> {
        if self.lock().profiles.contains_key(token.expose()) {
            Ok(token.expose().to_string())
        } else {
            Err(ApiError::Api {
                status: 401,
                message: Some("Not authorized, token failed".to_string()),
            })
        }
    }

    async fn wait_at_gate(&self) {
        let gate = self
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

/// Merge a delta into a line list the way the server does.
pub fn apply_delta(lines: &mut Vec<CartLine>, input: &CartLineInput) {
    if let Some(index) = lines.iter().position(|l| l.product_id == input.product_id) {
        let current = i64::from(lines[index].quantity) + i64::from(input.quantity);
        match u32::try_from(current) {
            Ok(quantity) if quantity > 0 => lines[index].quantity = quantity,
            _ => {
                lines.remove(index);
            }
        }
    } else if let Ok(quantity) = u32::try_from(input.quantity) {
        if quantity > 0 {
            lines.push(CartLine {
                product_id: input.product_id.clone(),
                name: input.name.clone(),
                price: input.price,
                image: input.image.clone(),
                quantity,
            });
        }
    }
}

impl StallApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.enter(Endpoint::Login)?;
        let state = self.lock();
        match state.accounts.get(credentials.email.as_str()) {
            Some((password, token)) if password == credentials.password.expose_secret() => {
                Ok(LoginResponse {
                    token: Some(token.clone()),
                })
            }
            _ => Err(ApiError::Api {
                status: 401,
                message: Some("Invalid email or password".to_string()),
            }),
        }
    }

    async fn me(&self, token: &AuthToken) -> Result<UserProfile, ApiError> {
        self.enter(Endpoint::Me)?;
        let key = self.authorize(token)?;
        self.lock()
            .profiles
            .get(&key)
            .cloned()
            .ok_or_else(|| ApiError::Parse("missing profile".to_string()))
    }

    async fn get_cart(&self, token: &AuthToken) -> Result<Vec<CartLine>, ApiError> {
        self.enter(Endpoint::GetCart)?;
        let key = self.authorize(token)?;
        Ok(self.lock().carts.get(&key).cloned().unwrap_or_default())
    }

    async fn add_to_cart(
        &self,
        token: &AuthToken,
        line: &CartLineInput,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.wait_at_gate().await;
        self.enter(Endpoint::AddToCart)?;
        let key = self.authorize(token)?;
        let mut state = self.lock();
        let cart = state.carts.entry(key).or_default();
        apply_delta(cart, line);
        Ok(cart.clone())
    }

    async fn remove_from_cart(
        &self,
        token: &AuthToken,
        product_id: &ProductId,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.wait_at_gate().await;
        self.enter(Endpoint::RemoveFromCart)?;
        let key = self.authorize(token)?;
        let mut state = self.lock();
        let cart = state.carts.entry(key).or_default();
        cart.retain(|l| &l.product_id != product_id);
        Ok(cart.clone())
    }

    async fn create_order(&self, token: &AuthToken, order: &NewOrder) -> Result<Order, ApiError> {
        self.wait_at_gate().await;
        self.enter(Endpoint::CreateOrder)?;
        self.authorize(token)?;
        let mut state = self.lock();
        state.orders.push(order.clone());
        let id = (!state.omit_order_id).then(|| OrderId::new(format!("o-{}", state.orders.len())));
        Ok(Order {
            id,
            order_items: order.order_items.clone(),
            shipping_address: order.shipping_address.clone(),
            total_price: order.total_price,
            payment_method: order.payment_method.to_string(),
            status: OrderStatus::Pending,
            created_at: None,
        })
    }

    async fn my_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        self.enter(Endpoint::MyOrders)?;
        self.authorize(token)?;
        Ok(self.lock().history.clone())
    }

    async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.enter(Endpoint::Products)?;
        Ok(self.lock().products.clone())
    }

    async fn create_booking(&self, token: &AuthToken, booking: &NewBooking) -> Result<(), ApiError> {
        self.enter(Endpoint::CreateBooking)?;
        self.authorize(token)?;
        self.lock().bookings.push(booking.clone());
        Ok(())
    }
}
