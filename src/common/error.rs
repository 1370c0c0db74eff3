// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

/// Tela de login para onde a sessão expirada é redirecionada.
pub const LOGIN_PATH: &str = "/auth/login";

/// Nome do cookie que carrega o token da sessão do painel.
pub const SESSION_COOKIE: &str = "painel_session";

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    #[error("O nome do setor é obrigatório")]
    SectorNameRequired,

    #[error("Nenhum membro selecionado")]
    MemberRequired,

    #[error("Um setor não pode ser pai de si mesmo")]
    SelfParent,

    #[error("O setor pai escolhido está dentro da subárvore do próprio setor")]
    CyclicParent,

    #[error("Setor pai não encontrado: {0}")]
    ParentNotFound(String),

    #[error("Setor não encontrado: {0}")]
    SectorNotFound(String),

    #[error("Ação destrutiva sem confirmação")]
    ConfirmationRequired,

    #[error("Já existe uma operação em andamento")]
    OperationPending,

    #[error("Sessão inválida")]
    InvalidSession,

    #[error("Sessão expirada")]
    SessionExpired,

    // Resposta não-2xx da API de assinaturas
    #[error("A API remota respondeu {status}: {message:?}")]
    Upstream { status: u16, message: Option<String> },

    #[error("Falha de rede: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

/// O corpo de erro que sai para o navegador.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip)]
    pub redirect_to: Option<&'static str>,
}

impl ApiError {
    fn new(status: StatusCode, error: String) -> Self {
        Self { status, error, details: None, redirect_to: None }
    }
}

impl AppError {
    /// Chave estável usada no catálogo de mensagens.
    pub fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::SectorNameRequired => "sector_name_required",
            AppError::MemberRequired => "member_required",
            AppError::SelfParent => "self_parent",
            AppError::CyclicParent => "cyclic_parent",
            AppError::ParentNotFound(_) => "parent_not_found",
            AppError::SectorNotFound(_) => "sector_not_found",
            AppError::ConfirmationRequired => "confirmation_required",
            AppError::OperationPending => "operation_pending",
            AppError::InvalidSession | AppError::SessionExpired => "session_expired",
            AppError::Upstream { .. } => "upstream_failure",
            AppError::Network(_) => "network_failure",
            _ => "internal_error",
        }
    }

    pub fn is_session_fatal(&self) -> bool {
        matches!(self, AppError::InvalidSession | AppError::SessionExpired)
    }

    /// Converte o erro interno na resposta traduzida para o idioma do usuário.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let message = store.translate(locale, self.message_key());

        match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                collect_validation_messages("", errors, &mut details);
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: message,
                    details: Some(json!(details)),
                    redirect_to: None,
                }
            }
            AppError::SectorNameRequired
            | AppError::MemberRequired
            | AppError::SelfParent
            | AppError::CyclicParent
            | AppError::ParentNotFound(_) => ApiError::new(StatusCode::BAD_REQUEST, message),
            AppError::SectorNotFound(_) => ApiError::new(StatusCode::NOT_FOUND, message),
            AppError::ConfirmationRequired => {
                ApiError::new(StatusCode::PRECONDITION_REQUIRED, message)
            }
            AppError::OperationPending => ApiError::new(StatusCode::CONFLICT, message),
            AppError::InvalidSession | AppError::SessionExpired => ApiError {
                status: StatusCode::SEE_OTHER,
                error: message,
                details: None,
                redirect_to: Some(LOGIN_PATH),
            },
            AppError::Upstream { status, message: server_message } => {
                // Redirecionamento ou status exótico da API não é repassado ao navegador
                let status = StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                if status.is_server_error() {
                    tracing::error!("🔥 API remota falhou: {}", self);
                }
                // A mensagem do servidor tem prioridade sobre o texto genérico
                ApiError::new(status, server_message.clone().unwrap_or(message))
            }
            AppError::Network(e) => {
                tracing::error!("🔥 Falha de rede ao falar com a API remota: {}", e);
                ApiError::new(StatusCode::BAD_GATEWAY, message)
            }
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

/// Achata os erros do `validator`, inclusive os de structs e listas aninhadas
/// (`signers[0].email`), num mapa caminho -> mensagens.
fn collect_validation_messages(
    prefix: &str,
    errors: &ValidationErrors,
    out: &mut HashMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                out.insert(path, messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_messages(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

/// Cookie vazio com expiração imediata, usado no logout e na sessão expirada.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(location) = self.redirect_to {
            return (
                [(header::SET_COOKIE, expired_session_cookie())],
                Redirect::to(location),
            )
                .into_response();
        }
        (self.status, Json(self)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::shared())
            .into_response()
    }
}
