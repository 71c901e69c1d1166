use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{activities, conflicts, registrations, volunteers, warnings};
use crate::middleware::auth::ApiKeys;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        activities::handlers::list_activities,
        activities::handlers::get_activity,
        activities::handlers::submit_activity,
        activities::handlers::update_activity,
        activities::handlers::delete_activity,
        activities::handlers::approve_activity,
        activities::handlers::reject_activity,
        activities::handlers::cancel_activity,
        activities::handlers::complete_activity,
        activities::handlers::auto_complete_activities,
        activities::handlers::submit_materials,
        activities::handlers::review_materials,
        activities::handlers::relocate_activity,
        activities::handlers::mark_participants_notified,
        registrations::handlers::check_eligibility,
        registrations::handlers::register,
        registrations::handlers::unregister,
        volunteers::handlers::list_volunteers,
        volunteers::handlers::get_volunteer,
        volunteers::handlers::credit_history,
        volunteers::handlers::adjust_credit,
        volunteers::handlers::override_credit,
        volunteers::handlers::registered_activities,
        volunteers::handlers::volunteer_conflicts,
        conflicts::handlers::detect_conflicts,
        warnings::handlers::list_warnings,
    ),
    components(
        schemas(
            volunteer_storage::dto::activity::CreateActivityRequest,
            volunteer_storage::dto::activity::UpdateActivityRequest,
            volunteer_storage::dto::activity::ApproveActivityRequest,
            volunteer_storage::dto::activity::RejectActivityRequest,
            volunteer_storage::dto::activity::CompleteActivityRequest,
            volunteer_storage::dto::activity::SubmitMaterialsRequest,
            volunteer_storage::dto::activity::ReviewMaterialsRequest,
            volunteer_storage::dto::activity::RelocateActivityRequest,
            volunteer_storage::dto::activity::ActivityResponse,
            volunteer_storage::dto::common::PaginationMeta,
            volunteer_storage::dto::conflict::DetectConflictsRequest,
            volunteer_storage::dto::conflict::VolunteerConflictsRequest,
            volunteer_storage::dto::conflict::ConflictResponse,
            volunteer_storage::dto::registration::EligibilityResponse,
            volunteer_storage::dto::volunteer::VolunteerResponse,
            volunteer_storage::dto::volunteer::CreditAdjustmentRequest,
            volunteer_storage::dto::volunteer::CreditOverrideRequest,
            volunteer_storage::models::Activity,
            volunteer_storage::models::ActivityStatus,
            volunteer_storage::models::ActivityType,
            volunteer_storage::models::Materials,
            volunteer_storage::models::Commitment,
            volunteer_storage::models::CommitmentRef,
            volunteer_storage::models::ConflictPair,
            volunteer_storage::models::CreditEntry,
            volunteer_storage::models::CreditReason,
            volunteer_storage::models::CreditTier,
            volunteer_storage::models::DenialReason,
            volunteer_storage::models::Notification,
            volunteer_storage::models::Role,
            volunteer_storage::models::ActivityWarning,
            volunteer_storage::models::WarningType,
            volunteer_storage::models::Severity,
            volunteer_storage::services::credit_ledger::CreditAdjustment,
            volunteer_storage::services::eligibility::Withdrawal,
            volunteer_storage::services::lifecycle::CompletionReport,
        )
    ),
    tags(
        (name = "activities", description = "Activity lifecycle endpoints"),
        (name = "registrations", description = "Volunteer registration endpoints"),
        (name = "volunteers", description = "Volunteer credit and schedule endpoints"),
        (name = "conflicts", description = "Schedule conflict detection"),
        (name = "warnings", description = "Advisory warnings for administrators"),
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

pub fn build_router(state: AppState, api_keys: ApiKeys) -> Router {
    let activity_routes =
        activities::routes::routes(api_keys.clone()).merge(registrations::routes::routes(api_keys.clone()));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/activities", activity_routes)
        .nest("/api/volunteers", volunteers::routes::routes(api_keys))
        .nest("/api/conflicts", conflicts::routes::routes())
        .nest("/api/warnings", warnings::routes::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
