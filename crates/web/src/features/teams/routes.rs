use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::handlers::{add_member, create_team, get_team, recompute_status, remove_member};
use crate::app::AppState;
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/teams", post(create_team))
        .route("/teams/:team_id/members", post(add_member))
        .route("/teams/:team_id/members/:entrant_id", delete(remove_member))
        .route("/teams/:team_id/recompute", post(recompute_status))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/teams/:team_id", get(get_team))
        .merge(protected)
}
