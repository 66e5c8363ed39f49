use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{create_event, get_event, list_disciplines, list_events, update_event_status};
use crate::app::AppState;
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/events", post(create_event))
        .route("/events/:event_id/status", put(update_event_status))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/events", get(list_events))
        .route("/events/:event_id", get(get_event))
        .route("/events/:event_id/disciplines", get(list_disciplines))
        .merge(protected)
}
