// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    api::AuthApi,
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentSession, i18n::Locale},
    models::{
        auth::User,
        settings::{ChangePasswordInput, ChangePasswordPayload, UpdateProfilePayload},
    },
};

// PATCH /api/settings/profile
#[utoipa::path(
    patch,
    path = "/api/settings/profile",
    tag = "Settings",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 400, description = "Nome curto ou e-mail inválido")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<User>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    AuthApi::new(app_state.client_for(&session))
        .update_profile(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // O usuário guardado na sessão precisa refletir o nome/e-mail novos
    let user = app_state
        .auth_service
        .refresh_user(&session)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.sessions.persist_or_warn().await;
    Ok(Json(user))
}

// POST /api/settings/password
#[utoipa::path(
    post,
    path = "/api/settings/password",
    tag = "Settings",
    request_body = ChangePasswordInput,
    responses(
        (status = 204, description = "Senha alterada"),
        (status = 400, description = "Senha curta ou confirmação diferente")
    ),
    security(("session_cookie" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Json(input): Json<ChangePasswordInput>,
) -> Result<StatusCode, ApiError> {
    input
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    AuthApi::new(app_state.client_for(&session))
        .change_password(&ChangePasswordPayload::from(input))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("🔑 Senha alterada na sessão {}", session.id());
    Ok(StatusCode::NO_CONTENT)
}
