// src/models/sector.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

// ---
// 1. Sector (O "Setor")
// ---
// Nó da árvore de setores, já aninhado como vem de GET /sectors/tree.
// `level` e `path` são calculados pela API; o painel nunca os envia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    #[schema(example = "c1a2b3")]
    pub id: String,

    #[schema(example = "Diretoria Jurídica")]
    pub name: String,

    #[schema(example = "JUR")]
    pub code: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub level: i32,

    // Ex: "raiz/juridico/contratos"
    pub path: Option<String>,

    #[serde(default)]
    pub parent_id: Option<String>,

    pub manager_id: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub user_count: u32,

    #[serde(default)]
    #[schema(no_recursion)]
    pub children: Vec<Sector>,
}

fn default_true() -> bool {
    true
}

impl Sector {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Linha da visão em lista: o registro sem os filhos.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectorRow {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub level: i32,
    pub path: Option<String>,
    pub parent_id: Option<String>,
    pub manager_id: Option<String>,
    pub is_active: bool,
    pub user_count: u32,
}

impl From<&Sector> for SectorRow {
    fn from(sector: &Sector) -> Self {
        Self {
            id: sector.id.clone(),
            name: sector.name.clone(),
            code: sector.code.clone(),
            description: sector.description.clone(),
            level: sector.level,
            path: sector.path.clone(),
            parent_id: sector.parent_id.clone(),
            manager_id: sector.manager_id.clone(),
            is_active: sector.is_active,
            user_count: sector.user_count,
        }
    }
}

/// Opção dos seletores "setor pai" / "destino".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SectorOption {
    pub id: String,
    #[schema(example = "——Contratos [CTR]")]
    pub label: String,
}

// ---
// 2. Membros
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

// Membro da organização: o universo de onde saem os membros de setor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
    pub user: UserSummary,
}

// Vínculo usuário-setor (um usuário aparece no máximo uma vez por setor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectorMember {
    pub id: String,
    pub user_id: String,
    pub sector_id: String,
    #[serde(default)]
    pub is_primary: bool,
    #[schema(example = "Coordenador")]
    pub role: Option<String>,
    pub user: UserSummary,
}

/// O painel lateral de membros de um setor.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub sector_id: String,
    pub members: Vec<SectorMember>,
    pub user_count: usize,
    pub available: Vec<OrganizationMember>,
    pub add_pending: bool,
    pub remove_pending: bool,
}

// ---
// 3. Payloads (O "Formulário")
// ---

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Campo obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

/// O que chega do navegador no formulário de setor.
///
/// Na edição, campo ausente significa "não alterado" e string vazia
/// significa "limpar".
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectorFormInput {
    #[serde(default)]
    #[schema(example = "Diretoria Jurídica")]
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub manager_id: Option<String>,
}

// POST /sectors: campos em branco são omitidos
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectorPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
}

// PATCH /sectors/{id}: None = não alterado, Some(None) = null explícito
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSectorPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberInput {
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub is_primary: bool,

    #[schema(example = "Analista")]
    pub role: Option<String>,
}

// POST /sectors/{id}/users
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberPayload {
    pub user_id: String,
    pub is_primary: bool,
    pub role: Option<String>,
}

/// Prévia exibida antes de desativar um setor.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeactivationPreview {
    pub sector_id: String,
    pub name: String,
    pub active_children: usize,
    #[schema(example = "Atenção: Este setor possui 2 sub-setor(es) ativo(s).")]
    pub warning: Option<String>,
}
