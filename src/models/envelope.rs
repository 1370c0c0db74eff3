// src/models/envelope.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeStatus {
    Draft,
    Running,
    Completed,
    Canceled,
}

impl EnvelopeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EnvelopeStatus::Draft => "Rascunho",
            EnvelopeStatus::Running => "Em andamento",
            EnvelopeStatus::Completed => "Concluído",
            EnvelopeStatus::Canceled => "Cancelado",
        }
    }

    pub fn as_query(&self) -> &'static str {
        match self {
            EnvelopeStatus::Draft => "DRAFT",
            EnvelopeStatus::Running => "RUNNING",
            EnvelopeStatus::Completed => "COMPLETED",
            EnvelopeStatus::Canceled => "CANCELED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignerStatus {
    Pending,
    Signed,
    Rejected,
}

// Linha da listagem de envelopes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: EnvelopeStatus,
    pub signers_count: u32,
    pub signed_count: u32,
    pub documents_count: u32,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: SignerStatus,
    pub signed_at: Option<DateTime<Utc>>,
    pub signing_order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDocument {
    pub id: String,
    pub name: String,
    pub file_size: u64,
    pub page_count: u32,
    pub status: EnvelopeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: EnvelopeStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub documents: Vec<EnvelopeDocument>,
    #[serde(default)]
    pub signers: Vec<Signer>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnvelopeFilter {
    pub search: Option<String>,
    pub status: Option<EnvelopeStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignerInput {
    #[validate(length(min = 1, message = "Nome do signatário é obrigatório"))]
    pub name: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEnvelopeInput {
    #[validate(length(min = 3, message = "Nome deve ter no mínimo 3 caracteres"))]
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "Adicione ao menos um signatário"), nested)]
    pub signers: Vec<SignerInput>,
}

// POST /envelopes: a ordem de assinatura segue a ordem informada
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnvelopePayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub signers: Vec<SignerPayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerPayload {
    pub name: String,
    pub email: String,
    pub signing_order: u32,
}

impl From<CreateEnvelopeInput> for CreateEnvelopePayload {
    fn from(input: CreateEnvelopeInput) -> Self {
        let signers = input
            .signers
            .into_iter()
            .zip(1..)
            .map(|(signer, order)| SignerPayload {
                name: signer.name.trim().to_string(),
                email: signer.email.trim().to_string(),
                signing_order: order,
            })
            .collect();

        Self {
            name: input.name.trim().to_string(),
            description: input.description.filter(|d| !d.trim().is_empty()),
            deadline: input.deadline,
            signers,
        }
    }
}
