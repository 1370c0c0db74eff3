// src/handlers/envelopes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    api::EnvelopeApi,
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentSession, i18n::Locale},
    models::{
        envelope::{CreateEnvelopeInput, CreateEnvelopePayload, Envelope, EnvelopeFilter, EnvelopeSummary},
        Confirmation,
    },
    services::query_cache::key,
};

// GET /api/envelopes?search=&status=
#[utoipa::path(
    get,
    path = "/api/envelopes",
    tag = "Envelopes",
    params(EnvelopeFilter),
    responses(
        (status = 200, description = "Envelopes da organização", body = Vec<EnvelopeSummary>)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_envelopes(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Query(filter): Query<EnvelopeFilter>,
) -> Result<Json<Vec<EnvelopeSummary>>, ApiError> {
    let search = filter.search.clone().unwrap_or_default();
    let status = filter.status.map(|s| s.as_query()).unwrap_or("all");

    let api = EnvelopeApi::new(app_state.client_for(&session));
    let envelopes = session
        .cache()
        .fetch(key(&["envelopes", search.as_str(), status]), move || {
            let api = api.clone();
            let filter = filter.clone();
            async move { api.list(&filter).await }
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(envelopes))
}

// GET /api/envelopes/{id}
#[utoipa::path(
    get,
    path = "/api/envelopes/{id}",
    tag = "Envelopes",
    params(("id" = String, Path, description = "ID do envelope")),
    responses(
        (status = 200, description = "Envelope com documentos e signatários", body = Envelope),
        (status = 404, description = "Envelope não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_envelope(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    let api = EnvelopeApi::new(app_state.client_for(&session));
    let envelope_id = id.clone();
    let envelope = session
        .cache()
        .fetch(key(&["envelope", id.as_str()]), move || {
            let api = api.clone();
            let id = envelope_id.clone();
            async move { api.get(&id).await }
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(envelope))
}

// POST /api/envelopes
#[utoipa::path(
    post,
    path = "/api/envelopes",
    tag = "Envelopes",
    request_body = CreateEnvelopeInput,
    responses(
        (status = 201, description = "Envelope criado como rascunho", body = Envelope),
        (status = 400, description = "Nome curto ou signatários inválidos")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_envelope(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Json(input): Json<CreateEnvelopeInput>,
) -> Result<impl IntoResponse, ApiError> {
    input
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payload = CreateEnvelopePayload::from(input);
    let envelope = EnvelopeApi::new(app_state.client_for(&session))
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("✉️ Envelope criado: {} ({} signatário(s))", envelope.name, payload.signers.len());
    session.cache().invalidate(&["envelopes"]);
    Ok((StatusCode::CREATED, Json(envelope)))
}

// POST /api/envelopes/{id}/activate
#[utoipa::path(
    post,
    path = "/api/envelopes/{id}/activate",
    tag = "Envelopes",
    params(("id" = String, Path, description = "ID do envelope")),
    responses(
        (status = 200, description = "Envelope enviado para assinatura", body = Envelope)
    ),
    security(("session_cookie" = []))
)]
pub async fn activate_envelope(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    let envelope = EnvelopeApi::new(app_state.client_for(&session))
        .activate(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    session.cache().invalidate(&["envelope", id.as_str()]);
    session.cache().invalidate(&["envelopes"]);
    Ok(Json(envelope))
}

// POST /api/envelopes/{id}/cancel?confirm=true
#[utoipa::path(
    post,
    path = "/api/envelopes/{id}/cancel",
    tag = "Envelopes",
    params(("id" = String, Path, description = "ID do envelope"), Confirmation),
    responses(
        (status = 200, description = "Envelope cancelado", body = Envelope),
        (status = 428, description = "Falta a confirmação")
    ),
    security(("session_cookie" = []))
)]
pub async fn cancel_envelope(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Query(confirmation): Query<Confirmation>,
) -> Result<Json<Envelope>, ApiError> {
    if !confirmation.confirm {
        return Err(AppError::ConfirmationRequired.to_api_error(&locale, &app_state.i18n_store));
    }

    let envelope = EnvelopeApi::new(app_state.client_for(&session))
        .cancel(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    session.cache().invalidate(&["envelope", id.as_str()]);
    session.cache().invalidate(&["envelopes"]);
    Ok(Json(envelope))
}

// POST /api/signers/{id}/resend-notification
#[utoipa::path(
    post,
    path = "/api/signers/{id}/resend-notification",
    tag = "Envelopes",
    params(("id" = String, Path, description = "ID do signatário")),
    responses(
        (status = 204, description = "Notificação reenviada")
    ),
    security(("session_cookie" = []))
)]
pub async fn resend_notification(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    EnvelopeApi::new(app_state.client_for(&session))
        .resend_notification(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
