use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{list_placements, medal_table, record_placements};
use crate::app::AppState;
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/heats/:heat_id/placements", post(record_placements))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/heats/:heat_id/placements", get(list_placements))
        .route("/events/:event_id/medals", get(medal_table))
        .merge(protected)
}
