// src/middleware/auth.rs

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Cookie, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError, SESSION_COOKIE},
    config::AppState,
    middleware::i18n::Locale,
    services::session::Session,
};

// O guardião das rotas do painel: cookie -> sessão autenticada
pub async fn session_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(SESSION_COOKIE).map(str::to_string));

    let Some(token) = token else {
        return Err(AppError::InvalidSession.to_api_error(&locale, &app_state.i18n_store));
    };

    let session = app_state
        .auth_service
        .validate_token(&token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Insere a sessão nos "extensions" da requisição
    request.extensions_mut().insert(CurrentSession(session));
    Ok(next.run(request).await)
}

// Extrator para obter a sessão diretamente nos handlers
#[derive(Clone)]
pub struct CurrentSession(pub Arc<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or(AppError::InvalidSession)
    }
}
