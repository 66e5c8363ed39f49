use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{create_entrant, get_entrant};
use crate::app::AppState;
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/entrants", post(create_entrant))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/entrants/:entrant_id", get(get_entrant))
        .merge(protected)
}
