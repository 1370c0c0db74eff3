// src/api/client.rs

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    common::error::AppError,
    models::auth::{RefreshRequest, TokenPair},
    services::session::{Session, SessionStore},
};

/// Cliente da API de assinaturas, preso a uma sessão do painel.
///
/// Todo pedido sai com `Authorization: Bearer`. Um `401` dispara um único
/// refresh seguido de uma única nova tentativa; se o refresh falhar (ou se o
/// segundo envio também voltar `401`), a sessão é limpa e o chamador recebe
/// `AppError::SessionExpired`.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
    sessions: SessionStore,
}

impl ApiClient {
    pub fn new(http: Client, base_url: &str, session: Arc<Session>, sessions: SessionStore) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string(), session, sessions }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.url(path);
        self.execute(|| self.http.get(&url)).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        self.execute(|| self.http.get(&url).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        self.execute(|| self.http.post(&url).json(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.url(path);
        self.execute(|| self.http.post(&url)).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        self.execute(|| self.http.patch(&url).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.url(path);
        self.execute(|| self.http.delete(&url)).await
    }

    async fn send(
        &self,
        build: &impl Fn() -> RequestBuilder,
        token: Option<&str>,
    ) -> Result<Response, AppError> {
        let mut request = build();
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<T, AppError> {
        let token = self.session.get_token();
        let response = self.send(&build, token.as_deref()).await?;
        tracing::debug!("API {} -> {}", response.url().path(), response.status());

        if response.status() != StatusCode::UNAUTHORIZED {
            return read_json(response).await;
        }

        let token = self.refresh_after(token).await?;
        let retry = self.send(&build, Some(&token)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Novo 401 depois do refresh, encerrando a sessão {}", self.session.id());
            return Err(self.expire_session().await);
        }
        read_json(retry).await
    }

    /// Troca o access token depois de um 401 recebido com `stale`.
    async fn refresh_after(&self, stale: Option<String>) -> Result<String, AppError> {
        let _guard = self.session.lock_refresh().await;

        // Outro pedido da mesma sessão já renovou o token enquanto esperávamos
        if let Some(current) = self.session.get_token() {
            if Some(&current) != stale.as_ref() {
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            tracing::warn!("401 sem refresh token na sessão {}", self.session.id());
            return Err(self.expire_session().await);
        };

        tracing::info!("🔄 Renovando o token da sessão {}", self.session.id());
        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequest { refresh_token: &refresh_token })
            .send()
            .await;

        let pair = match response {
            Ok(response) if response.status().is_success() => response.json::<TokenPair>().await.ok(),
            Ok(response) => {
                tracing::warn!("Refresh recusado pela API: {}", response.status());
                None
            }
            Err(e) => {
                tracing::warn!("Refresh falhou: {}", e);
                None
            }
        };

        let Some(pair) = pair else {
            return Err(self.expire_session().await);
        };

        let access_token = pair.access_token.clone();
        self.session.set_tokens(pair);
        self.sessions.persist_or_warn().await;
        Ok(access_token)
    }

    async fn expire_session(&self) -> AppError {
        tracing::warn!("⚠️ Sessão {} expirada, tokens descartados", self.session.id());
        self.session.clear();
        self.sessions.remove(self.session.id()).await;
        self.sessions.persist_or_warn().await;
        AppError::SessionExpired
    }
}

/// Lê o corpo de uma resposta 2xx (corpo vazio vira `null`), ou monta o erro.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }

    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) async fn upstream_error(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body: Option<Value> = response.json().await.ok();
    AppError::Upstream { status, message: body.as_ref().and_then(server_message) }
}

/// `{"message": "..."}`, `{"message": ["...", "..."]}` ou `{"error": "..."}`.
pub(crate) fn server_message(body: &Value) -> Option<String> {
    match body.get("message") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => body.get("error").and_then(Value::as_str).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn server_message_shapes() {
        assert_eq!(server_message(&json!({ "message": "Código duplicado" })).as_deref(), Some("Código duplicado"));
        assert_eq!(
            server_message(&json!({ "message": ["name too short", "email invalid"] })).as_deref(),
            Some("name too short; email invalid")
        );
        assert_eq!(server_message(&json!({ "error": "Forbidden" })).as_deref(), Some("Forbidden"));
        assert_eq!(server_message(&json!({ "statusCode": 500 })), None);
    }
}
