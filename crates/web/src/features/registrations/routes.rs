use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    confirm, disqualify, get_registration, list_eligible, mark_no_show, mark_paid,
    register_individual, sign_up,
};
use crate::app::AppState;
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/registrations", post(sign_up))
        .route("/registrations/:registration_id/confirm", post(confirm))
        .route(
            "/registrations/:registration_id/register",
            post(register_individual),
        )
        .route("/registrations/:registration_id/disqualify", post(disqualify))
        .route("/registrations/:registration_id/no-show", post(mark_no_show))
        .route("/registrations/:registration_id/paid", post(mark_paid))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/registrations/:registration_id", get(get_registration))
        .route("/events/:event_id/eligible", get(list_eligible))
        .merge(protected)
}
