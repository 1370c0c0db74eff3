// src/handlers/auth.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::{expired_session_cookie, ApiError},
    config::AppState,
    middleware::{auth::CurrentSession, i18n::Locale},
    models::auth::{LoginPayload, LoginResponse, LoginScreen, User},
};

const LOGIN_ENDPOINT: &str = "/api/auth/login";

// GET /auth/login
#[utoipa::path(
    get,
    path = "/auth/login",
    tag = "Auth",
    responses(
        (status = 200, description = "Tela de login (destino da sessão expirada)", body = LoginScreen)
    )
)]
pub async fn login_screen(State(app_state): State<AppState>, locale: Locale) -> Json<LoginScreen> {
    Json(LoginScreen {
        message: app_state.i18n_store.translate(&locale, "login_required"),
        login_endpoint: LOGIN_ENDPOINT,
    })
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login efetuado; cookie de sessão definido", body = LoginResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais recusadas pela API")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let (session, token) = app_state
        .auth_service
        .login(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let cookie = app_state.auth_service.session_cookie(&token);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { user: session.user() }),
    ))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Sessão encerrada e cookie removido")
    ),
    security(("session_cookie" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    app_state.auth_service.logout(&session).await;
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, expired_session_cookie())])
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário da sessão", body = User),
        (status = 303, description = "Sessão expirada, redireciona para /auth/login")
    ),
    security(("session_cookie" = []))
)]
pub async fn me(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
) -> Result<Json<User>, ApiError> {
    let user = app_state
        .auth_service
        .me(&session)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(user))
}
