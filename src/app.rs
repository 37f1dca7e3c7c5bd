use crate::handlers;
use crate::state::AppState;
use crate::storage::KeyValueMedium;
use axum::{routing::{get, post}, Router};

pub fn router<M: KeyValueMedium + 'static>(state: AppState<M>) -> Router {
    Router::new()
        .route("/", get(handlers::index::<M>))
        .route("/toggle/:hour", post(handlers::toggle_form::<M>))
        .route("/api/today", get(handlers::get_today::<M>))
        .route("/api/days/:date", get(handlers::get_day::<M>))
        .route("/api/history", get(handlers::get_history::<M>))
        .route("/api/toggle", post(handlers::toggle::<M>))
        .with_state(state)
}
