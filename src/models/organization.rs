// src/models/organization.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Resumo da organização, de GET /organizations/me
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStats {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub plan: String,
    pub is_active: bool,
    pub max_users: u32,
    pub max_envelopes: Option<u32>,
    pub current_users: u32,
    pub current_month_envelopes: u32,
    pub storage_used: u64,
    pub sectors_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectorRef {
    pub id: String,
    pub name: String,
}

// Linha da tela de membros da organização
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sectors: Vec<SectorRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMemberPayload {
    #[validate(length(min = 2, message = "Nome deve ter no mínimo 2 caracteres"))]
    pub name: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 8, message = "Senha deve ter no mínimo 8 caracteres"))]
    pub password: String,
    #[validate(custom(function = "assignable_role"))]
    pub role: MemberRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRolePayload {
    #[validate(custom(function = "assignable_role"))]
    pub role: MemberRole,
}

// O dono só muda por transferência, nunca por esta tela
fn assignable_role(role: &MemberRole) -> Result<(), validator::ValidationError> {
    if *role == MemberRole::Owner {
        let mut err = validator::ValidationError::new("role");
        err.message = Some("Função inválida: use ADMIN ou MEMBER".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganizationPayload {
    #[validate(length(min = 2, message = "Nome deve ter no mínimo 2 caracteres"))]
    pub name: String,
}
