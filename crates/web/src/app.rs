use axum::{Router, extract::FromRef};
use storage::{Database, models::DrawSettings};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features;
use crate::middleware::auth::ApiKeys;

/// Shared handler state. Handlers that only need the database extract
/// `State<Database>` through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub draw_defaults: DrawSettings,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        features::events::handlers::list_events,
        features::events::handlers::get_event,
        features::events::handlers::list_disciplines,
        features::events::handlers::create_event,
        features::events::handlers::update_event_status,
        features::entrants::handlers::get_entrant,
        features::entrants::handlers::create_entrant,
        features::registrations::handlers::get_registration,
        features::registrations::handlers::list_eligible,
        features::registrations::handlers::sign_up,
        features::registrations::handlers::confirm,
        features::registrations::handlers::register_individual,
        features::registrations::handlers::disqualify,
        features::registrations::handlers::mark_no_show,
        features::registrations::handlers::mark_paid,
        features::teams::handlers::create_team,
        features::teams::handlers::get_team,
        features::teams::handlers::add_member,
        features::teams::handlers::remove_member,
        features::teams::handlers::recompute_status,
        features::draws::handlers::run_draw,
        features::draws::handlers::run_next_round,
        features::draws::handlers::list_heats,
        features::results::handlers::record_placements,
        features::results::handlers::list_placements,
        features::results::handlers::medal_table,
    ),
    components(
        schemas(
            storage::dto::common::PaginationMeta,
            storage::dto::event::CreateEventRequest,
            storage::dto::event::DrawSettingsRequest,
            storage::dto::event::UpdateEventStatusRequest,
            storage::dto::event::EventResponse,
            storage::dto::event::DisciplineResponse,
            storage::dto::entrant::CreateEntrantRequest,
            storage::dto::entrant::EntrantResponse,
            storage::dto::registration::SignUpRequest,
            storage::dto::registration::DisqualifyRequest,
            storage::dto::registration::MarkPaidRequest,
            storage::dto::registration::RegistrationResponse,
            storage::dto::registration::EligibleEntrant,
            storage::dto::team::CreateTeamRequest,
            storage::dto::team::AddMemberRequest,
            storage::dto::team::TeamResponse,
            storage::dto::team::TeamMemberResponse,
            storage::dto::team::RemoveMemberResponse,
            storage::dto::team::RecomputeResponse,
            storage::dto::draw::DrawRequest,
            storage::dto::draw::DrawResponse,
            storage::dto::draw::HeatResponse,
            storage::dto::draw::LaneResponse,
            storage::dto::results::PlacementEntryRequest,
            storage::dto::results::RecordPlacementsRequest,
            storage::dto::results::PlacementResponse,
            storage::dto::results::DisciplineMedals,
            storage::dto::results::MedalTableResponse,
            storage::services::results_aggregator::MedalTally,
            storage::services::roster::StatusChange,
            storage::models::EventProgram,
            storage::models::ClassProgram,
            storage::models::AgeBand,
            storage::models::AgeBands,
            storage::models::DrawSettings,
            storage::models::EventStatus,
            storage::models::RegistrationStatus,
            storage::models::RoleTag,
            storage::models::Round,
            storage::models::Sex,
            storage::models::Competitor,
        )
    ),
    tags(
        (name = "events", description = "Events and their programs"),
        (name = "entrants", description = "Entrant records"),
        (name = "registrations", description = "Registration lifecycle"),
        (name = "teams", description = "Crew rosters"),
        (name = "draws", description = "Heat draws and start protocols"),
        (name = "results", description = "Placements and medal tallies"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

pub fn router(state: AppState, api_keys: ApiKeys) -> Router {
    let api = Router::new()
        .merge(features::events::routes::routes(api_keys.clone()))
        .merge(features::entrants::routes::routes(api_keys.clone()))
        .merge(features::registrations::routes::routes(api_keys.clone()))
        .merge(features::teams::routes::routes(api_keys.clone()))
        .merge(features::draws::routes::routes(api_keys.clone()))
        .merge(features::results::routes::routes(api_keys));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .with_state(state)
}
