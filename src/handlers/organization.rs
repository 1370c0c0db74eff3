// src/handlers/organization.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    api::OrganizationApi,
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentSession, i18n::Locale},
    models::{
        organization::{
            CreateMemberPayload, Member, OrganizationStats, UpdateOrganizationPayload,
            UpdateRolePayload,
        },
        Confirmation,
    },
    services::query_cache::key,
};

// GET /api/organization
#[utoipa::path(
    get,
    path = "/api/organization",
    tag = "Organization",
    responses(
        (status = 200, description = "Dados e uso do plano da organização", body = OrganizationStats)
    ),
    security(("session_cookie" = []))
)]
pub async fn get_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
) -> Result<Json<OrganizationStats>, ApiError> {
    let api = OrganizationApi::new(app_state.client_for(&session));
    let stats = session
        .cache()
        .fetch(key(&["organization"]), move || {
            let api = api.clone();
            async move { api.stats().await }
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(stats))
}

// PATCH /api/organization
#[utoipa::path(
    patch,
    path = "/api/organization",
    tag = "Organization",
    request_body = UpdateOrganizationPayload,
    responses(
        (status = 200, description = "Organização atualizada", body = OrganizationStats),
        (status = 400, description = "Nome muito curto")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<UpdateOrganizationPayload>,
) -> Result<Json<OrganizationStats>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let updated = OrganizationApi::new(app_state.client_for(&session))
        .update(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    session.cache().invalidate(&["organization"]);
    Ok(Json(updated))
}

// GET /api/organization/members
#[utoipa::path(
    get,
    path = "/api/organization/members",
    tag = "Organization",
    responses(
        (status = 200, description = "Membros da organização", body = Vec<Member>)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<Member>>, ApiError> {
    let api = OrganizationApi::new(app_state.client_for(&session));
    let members = session
        .cache()
        .fetch(key(&["organization", "members"]), move || {
            let api = api.clone();
            async move { api.members().await }
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(members))
}

// POST /api/organization/members
#[utoipa::path(
    post,
    path = "/api/organization/members",
    tag = "Organization",
    request_body = CreateMemberPayload,
    responses(
        (status = 201, description = "Membro criado", body = Member),
        (status = 400, description = "Dados inválidos")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<CreateMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = OrganizationApi::new(app_state.client_for(&session))
        .create_member(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("👤 Membro criado: {}", member.email);
    session.cache().invalidate(&["organization"]);
    Ok((StatusCode::CREATED, Json(member)))
}

// PATCH /api/organization/members/{id}/role
#[utoipa::path(
    patch,
    path = "/api/organization/members/{id}/role",
    tag = "Organization",
    params(("id" = String, Path, description = "ID do membro")),
    request_body = UpdateRolePayload,
    responses(
        (status = 200, description = "Função alterada", body = Member),
        (status = 400, description = "Função inválida (só ADMIN ou MEMBER)")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_member_role(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<Json<Member>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = OrganizationApi::new(app_state.client_for(&session))
        .update_role(&id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    session.cache().invalidate(&["organization", "members"]);
    Ok(Json(member))
}

// DELETE /api/organization/members/{id}?confirm=true
#[utoipa::path(
    delete,
    path = "/api/organization/members/{id}",
    tag = "Organization",
    params(("id" = String, Path, description = "ID do membro"), Confirmation),
    responses(
        (status = 204, description = "Membro removido"),
        (status = 428, description = "Falta a confirmação")
    ),
    security(("session_cookie" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Query(confirmation): Query<Confirmation>,
) -> Result<StatusCode, ApiError> {
    if !confirmation.confirm {
        return Err(AppError::ConfirmationRequired.to_api_error(&locale, &app_state.i18n_store));
    }

    OrganizationApi::new(app_state.client_for(&session))
        .remove_member(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // O membro também sai das listas de setor
    session.cache().invalidate(&["organization"]);
    session.cache().invalidate(&["sectors"]);
    Ok(StatusCode::NO_CONTENT)
}
