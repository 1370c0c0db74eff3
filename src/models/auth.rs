// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Usuário autenticado, como devolvido por GET /auth/me
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub organization_id: String,
    #[serde(default)]
    pub organization: Option<OrganizationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrganizationSummary {
    pub id: String,
    pub name: String,
    pub plan: String,
}

// Dados para login
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "ana@empresa.com.br")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// O par de tokens emitido pela API em /auth/login e /auth/refresh.
// No refresh o refreshToken pode não vir (a API mantém o anterior).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

// Resposta do login do painel
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: Option<User>,
}

/// Descritor da tela de login (destino do redirecionamento de sessão expirada).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginScreen {
    pub message: String,
    pub login_endpoint: &'static str,
}

// Estrutura de dados ("claims") dentro do JWT do cookie de sessão
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,  // Subject (ID da sessão do painel)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}
