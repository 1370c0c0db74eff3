// src/handlers/api_tokens.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    api::TokenApi,
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentSession, i18n::Locale},
    models::{
        api_token::{ApiToken, CreateApiTokenPayload, CreatedApiToken},
        Confirmation,
    },
    services::query_cache::key,
};

// GET /api/api-tokens
#[utoipa::path(
    get,
    path = "/api/api-tokens",
    tag = "API Tokens",
    responses(
        (status = 200, description = "Tokens de integração (sem o segredo)", body = Vec<ApiToken>)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_tokens(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<ApiToken>>, ApiError> {
    let api = TokenApi::new(app_state.client_for(&session));
    let tokens = session
        .cache()
        .fetch(key(&["api-tokens"]), move || {
            let api = api.clone();
            async move { api.list().await }
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tokens))
}

// POST /api/api-tokens
#[utoipa::path(
    post,
    path = "/api/api-tokens",
    tag = "API Tokens",
    request_body = CreateApiTokenPayload,
    responses(
        (status = 201, description = "Token criado; o segredo só aparece nesta resposta", body = CreatedApiToken),
        (status = 400, description = "Nome em branco")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_token(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<CreateApiTokenPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let created = TokenApi::new(app_state.client_for(&session))
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("🔐 Token de API criado: {}", payload.name);
    session.cache().invalidate(&["api-tokens"]);
    Ok((StatusCode::CREATED, Json(created)))
}

// POST /api/api-tokens/{id}/revoke
#[utoipa::path(
    post,
    path = "/api/api-tokens/{id}/revoke",
    tag = "API Tokens",
    params(("id" = String, Path, description = "ID do token")),
    responses(
        (status = 204, description = "Token revogado")
    ),
    security(("session_cookie" = []))
)]
pub async fn revoke_token(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    TokenApi::new(app_state.client_for(&session))
        .revoke(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    session.cache().invalidate(&["api-tokens"]);
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/api-tokens/{id}?confirm=true
#[utoipa::path(
    delete,
    path = "/api/api-tokens/{id}",
    tag = "API Tokens",
    params(("id" = String, Path, description = "ID do token"), Confirmation),
    responses(
        (status = 204, description = "Token excluído"),
        (status = 428, description = "Falta a confirmação")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_token(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Query(confirmation): Query<Confirmation>,
) -> Result<StatusCode, ApiError> {
    if !confirmation.confirm {
        return Err(AppError::ConfirmationRequired.to_api_error(&locale, &app_state.i18n_store));
    }

    TokenApi::new(app_state.client_for(&session))
        .delete(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    session.cache().invalidate(&["api-tokens"]);
    Ok(StatusCode::NO_CONTENT)
}
