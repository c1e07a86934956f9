/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - drinks: DrinkStore, auth: AuthService
 * - Cheap to clone (Arc inside)
 */
use std::sync::Arc;

use crate::repos::DrinkStore;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub drinks: Arc<dyn DrinkStore>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(drinks: Arc<dyn DrinkStore>, auth: Arc<AuthService>) -> Self {
        Self { drinks, auth }
    }
}
