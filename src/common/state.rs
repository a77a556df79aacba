// Application state shared across all handlers

use std::sync::Arc;

use crate::auth::store::UserStore;
use crate::auth::tokens::TokenService;

/// Application state containing the user store, token service, and hashing cost
///
/// Constructed once at startup and shared behind an `Arc` through an
/// `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub tokens: TokenService,
    pub password_cost: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService, password_cost: u32) -> Self {
        Self {
            store,
            tokens,
            password_cost,
        }
    }
}
