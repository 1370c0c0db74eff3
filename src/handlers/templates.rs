// src/handlers/templates.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::TemplateApi,
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentSession, i18n::Locale},
    models::{
        template::{DocumentTemplate, TemplateFilter},
        Confirmation,
    },
    services::query_cache::key,
};

// GET /api/templates?search=
#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Templates",
    params(TemplateFilter),
    responses(
        (status = 200, description = "Modelos de documento", body = Vec<DocumentTemplate>)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Query(filter): Query<TemplateFilter>,
) -> Result<Json<Vec<DocumentTemplate>>, ApiError> {
    let search = filter.search.clone().unwrap_or_default();
    let api = TemplateApi::new(app_state.client_for(&session));
    let templates = session
        .cache()
        .fetch(key(&["templates", search.as_str()]), move || {
            let api = api.clone();
            let filter = filter.clone();
            async move { api.list(&filter).await }
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(templates))
}

// DELETE /api/templates/{id}?confirm=true
#[utoipa::path(
    delete,
    path = "/api/templates/{id}",
    tag = "Templates",
    params(("id" = String, Path, description = "ID do modelo"), Confirmation),
    responses(
        (status = 204, description = "Modelo excluído"),
        (status = 428, description = "Falta a confirmação")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_template(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Query(confirmation): Query<Confirmation>,
) -> Result<StatusCode, ApiError> {
    if !confirmation.confirm {
        return Err(AppError::ConfirmationRequired.to_api_error(&locale, &app_state.i18n_store));
    }

    TemplateApi::new(app_state.client_for(&session))
        .delete(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    session.cache().invalidate(&["templates"]);
    Ok(StatusCode::NO_CONTENT)
}
