// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::session_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_auth_routes = Router::new().route("/login", post(handlers::auth::login));

    let auth_routes = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me));

    let sector_routes = Router::new()
        .route(
            "/",
            get(handlers::sectors::list_sectors).post(handlers::sectors::create_sector),
        )
        .route("/options", get(handlers::sectors::sector_options))
        .route("/tree", get(handlers::sectors::get_tree))
        .route("/tree/reset", post(handlers::sectors::reset_tree))
        .route("/tree/{id}/toggle", post(handlers::sectors::toggle_node))
        .route(
            "/{id}",
            patch(handlers::sectors::update_sector).delete(handlers::sectors::deactivate_sector),
        )
        .route("/{id}/actions", post(handlers::sectors::run_action))
        .route("/{id}/deactivation", get(handlers::sectors::deactivation_preview))
        .route(
            "/{id}/members",
            get(handlers::sectors::get_roster).post(handlers::sectors::add_member),
        )
        .route("/{id}/members/{user_id}", delete(handlers::sectors::remove_member));

    let organization_routes = Router::new()
        .route(
            "/",
            get(handlers::organization::get_organization)
                .patch(handlers::organization::update_organization),
        )
        .route(
            "/members",
            get(handlers::organization::list_members).post(handlers::organization::create_member),
        )
        .route("/members/{id}/role", patch(handlers::organization::update_member_role))
        .route("/members/{id}", delete(handlers::organization::remove_member));

    let envelope_routes = Router::new()
        .route(
            "/",
            get(handlers::envelopes::list_envelopes).post(handlers::envelopes::create_envelope),
        )
        .route("/{id}", get(handlers::envelopes::get_envelope))
        .route("/{id}/activate", post(handlers::envelopes::activate_envelope))
        .route("/{id}/cancel", post(handlers::envelopes::cancel_envelope));

    let template_routes = Router::new()
        .route("/", get(handlers::templates::list_templates))
        .route("/{id}", delete(handlers::templates::delete_template));

    let token_routes = Router::new()
        .route(
            "/",
            get(handlers::api_tokens::list_tokens).post(handlers::api_tokens::create_token),
        )
        .route("/{id}/revoke", post(handlers::api_tokens::revoke_token))
        .route("/{id}", delete(handlers::api_tokens::delete_token));

    let settings_routes = Router::new()
        .route("/profile", patch(handlers::settings::update_profile))
        .route("/password", post(handlers::settings::change_password));

    // Tudo abaixo exige o cookie de sessão
    let guarded = Router::new()
        .nest("/auth", auth_routes)
        .nest("/sectors", sector_routes)
        .nest("/organization", organization_routes)
        .nest("/envelopes", envelope_routes)
        .route(
            "/signers/{id}/resend-notification",
            post(handlers::envelopes::resend_notification),
        )
        .nest("/templates", template_routes)
        .nest("/api-tokens", token_routes)
        .nest("/settings", settings_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), session_guard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route("/auth/login", get(handlers::auth::login_screen))
        .nest("/api/auth", public_auth_routes)
        .nest("/api", guarded)
        .with_state(app_state)
}
