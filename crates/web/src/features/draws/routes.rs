use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{list_heats, run_draw, run_next_round};
use crate::app::AppState;
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/events/:event_id/draws", post(run_draw))
        .route("/events/:event_id/draws/next", post(run_next_round))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/events/:event_id/heats", get(list_heats))
        .merge(protected)
}
