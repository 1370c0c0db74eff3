// src/services/auth.rs

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use reqwest::Client;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{auth_api, ApiClient, AuthApi},
    common::error::{AppError, SESSION_COOKIE},
    models::auth::{LoginPayload, SessionClaims, User},
    services::session::{Session, SessionStore},
};

#[derive(Clone)]
pub struct AuthService {
    http: Client,
    api_url: String,
    session_secret: String,
    session_ttl: chrono::Duration,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(
        http: Client,
        api_url: String,
        session_secret: String,
        session_ttl: chrono::Duration,
        sessions: SessionStore,
    ) -> Self {
        Self { http, api_url, session_secret, session_ttl, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Cliente da API remota autenticado com os tokens desta sessão.
    pub fn client_for(&self, session: Arc<Session>) -> ApiClient {
        ApiClient::new(self.http.clone(), &self.api_url, session, self.sessions.clone())
    }

    /// Login na API remota, seguido da leitura do usuário.
    ///
    /// Devolve a sessão nova e o token que vai no cookie.
    pub async fn login(&self, payload: &LoginPayload) -> Result<(Arc<Session>, String), AppError> {
        payload.validate()?;

        let tokens = auth_api::login(&self.http, &self.api_url, payload).await?;
        let session = self.sessions.create(tokens).await;

        // Sessão recém-criada sem usuário não serve para nada: descarta
        if let Err(e) = self.refresh_user(&session).await {
            session.clear();
            self.sessions.remove(session.id()).await;
            return Err(e);
        }

        self.sessions.persist_or_warn().await;
        tracing::info!("🔑 Login de {} (sessão {})", payload.email, session.id());

        let token = self.create_token(session.id())?;
        Ok((session, token))
    }

    /// Relê `/auth/me`. Um erro passageiro não derruba a sessão; o 401
    /// irrecuperável já foi tratado pelo `ApiClient`.
    pub async fn refresh_user(&self, session: &Arc<Session>) -> Result<User, AppError> {
        let user = AuthApi::new(self.client_for(session.clone())).me().await?;
        session.set_user(Some(user.clone()));
        Ok(user)
    }

    pub async fn me(&self, session: &Arc<Session>) -> Result<User, AppError> {
        match session.user() {
            Some(user) => Ok(user),
            None => self.refresh_user(session).await,
        }
    }

    pub async fn logout(&self, session: &Session) {
        session.clear();
        self.sessions.remove(session.id()).await;
        self.sessions.persist_or_warn().await;
        tracing::info!("👋 Logout da sessão {}", session.id());
    }

    /// Resolve o cookie do navegador para a sessão ativa.
    pub async fn validate_token(&self, token: &str) -> Result<Arc<Session>, AppError> {
        let token_data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.session_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidSession)?;

        let session = self
            .sessions
            .get(token_data.claims.sub)
            .await
            .ok_or(AppError::InvalidSession)?;

        if !session.is_authenticated() {
            self.sessions.remove(session.id()).await;
            return Err(AppError::SessionExpired);
        }
        Ok(session)
    }

    pub fn create_token(&self, session_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = SessionClaims {
            sub: session_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.session_secret.as_ref()),
        )?)
    }

    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.session_ttl.num_seconds()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::auth::TokenPair;

    fn service() -> AuthService {
        AuthService::new(
            Client::new(),
            "http://localhost:9".into(),
            "segredo-de-teste".into(),
            chrono::Duration::hours(1),
            SessionStore::in_memory(Duration::from_secs(30)),
        )
    }

    #[tokio::test]
    async fn cookie_token_resolves_to_its_session() {
        let auth = service();
        let session = auth
            .sessions()
            .create(TokenPair { access_token: "a1".into(), refresh_token: Some("r1".into()) })
            .await;

        let token = auth.create_token(session.id()).unwrap();
        let resolved = auth.validate_token(&token).await.unwrap();
        assert_eq!(resolved.id(), session.id());

        session.clear();
        assert!(matches!(auth.validate_token(&token).await, Err(AppError::SessionExpired)));
        // A sessão sem tokens sai do store no mesmo acesso
        assert!(auth.sessions().get(session.id()).await.is_none());
        assert!(matches!(auth.validate_token(&token).await, Err(AppError::InvalidSession)));
    }

    #[tokio::test]
    async fn foreign_or_unknown_tokens_are_rejected() {
        let auth = service();
        assert!(matches!(auth.validate_token("lixo").await, Err(AppError::InvalidSession)));

        let orphan = auth.create_token(Uuid::new_v4()).unwrap();
        assert!(matches!(auth.validate_token(&orphan).await, Err(AppError::InvalidSession)));
    }

    #[test]
    fn cookie_carries_ttl() {
        let cookie = service().session_cookie("abc");
        assert!(cookie.starts_with("painel_session=abc;"));
        assert!(cookie.contains("Max-Age=3600"));
    }
}
