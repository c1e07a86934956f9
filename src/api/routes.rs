/*
 * Responsibility
 * - URL layout of the drinks API
 * - Which permission each route requires is declared by the handler's
 *   Authorized<P> argument, not here
 * - Unknown paths get the JSON 404 envelope
 */
use axum::{
    Router,
    routing::{get, patch},
};

use crate::error::AppError;
use crate::state::AppState;

use crate::api::handlers::{
    drinks::{create_drink, delete_drink, drinks_detail, list_drinks, update_drink},
    health::health,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/drinks", get(list_drinks).post(create_drink))
        .route("/drinks-detail", get(drinks_detail))
        .route("/drinks/{drink_id}", patch(update_drink).delete(delete_drink))
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
