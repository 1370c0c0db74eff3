// src/services/sector_form.rs

//! Formulário de criação/edição de setor.
//!
//! Estados: `Idle -> Editing -> Submitting -> (Success -> Idle) | (Error -> Editing)`.
//!
//! Na criação, campos opcionais em branco são omitidos do payload. Na edição,
//! um campo em branco vira `null` explícito (limpar) e um campo ausente não é
//! enviado (não alterado).

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    models::sector::{CreateSectorPayload, Sector, SectorFormInput, UpdateSectorPayload},
    services::sector_tree::validate_parent,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum FormState {
    Idle,
    Editing,
    Submitting,
    Success,
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum FormMode {
    Create,
    #[serde(rename_all = "camelCase")]
    Edit { sector_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectorSubmission {
    Create(CreateSectorPayload),
    Update { sector_id: String, payload: UpdateSectorPayload },
}

#[derive(Debug, Clone)]
pub struct SectorForm {
    mode: FormMode,
    state: FormState,
    input: SectorFormInput,
}

fn filled(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn patch(value: &Option<String>) -> Option<Option<String>> {
    value.as_ref().map(|_| filled(value))
}

impl Default for SectorForm {
    fn default() -> Self {
        Self { mode: FormMode::Create, state: FormState::Idle, input: SectorFormInput::default() }
    }
}

impl SectorForm {
    /// "Novo setor", opcionalmente já como filho de `parent_id`.
    pub fn open_create(parent_id: Option<&str>) -> Self {
        let input = SectorFormInput {
            parent_id: parent_id.map(str::to_string),
            ..SectorFormInput::default()
        };
        Self { mode: FormMode::Create, state: FormState::Editing, input }
    }

    /// "Editar setor", preenchido com os valores atuais.
    pub fn open_edit(sector: &Sector) -> Self {
        let input = SectorFormInput {
            name: sector.name.clone(),
            code: Some(sector.code.clone().unwrap_or_default()),
            description: Some(sector.description.clone().unwrap_or_default()),
            parent_id: Some(sector.parent_id.clone().unwrap_or_default()),
            manager_id: Some(sector.manager_id.clone().unwrap_or_default()),
        };
        Self {
            mode: FormMode::Edit { sector_id: sector.id.clone() },
            state: FormState::Editing,
            input,
        }
    }

    /// Formulário já preenchido pelo navegador.
    pub fn with_input(mode: FormMode, input: SectorFormInput) -> Self {
        Self { mode, state: FormState::Editing, input }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn input(&self) -> &SectorFormInput {
        &self.input
    }

    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Create => None,
            FormMode::Edit { sector_id } => Some(sector_id),
        }
    }

    /// O setor pai escolhido, se houver.
    pub fn chosen_parent(&self) -> Option<String> {
        filled(&self.input.parent_id)
    }

    /// Altera os campos; um erro anterior volta para `Editing`.
    pub fn edit(&mut self, change: impl FnOnce(&mut SectorFormInput)) {
        change(&mut self.input);
        if matches!(self.state, FormState::Idle | FormState::Error { .. }) {
            self.state = FormState::Editing;
        }
    }

    /// Checagem local, feita antes de qualquer chamada de rede.
    pub fn check_required(&self) -> Result<(), AppError> {
        if self.input.name.trim().is_empty() {
            return Err(AppError::SectorNameRequired);
        }
        Ok(())
    }

    /// `Editing -> Submitting`, devolvendo o payload a enviar.
    ///
    /// Em caso de erro de validação o formulário continua em `Editing`.
    pub fn submit(&mut self, forest: &[Sector]) -> Result<SectorSubmission, AppError> {
        match self.state {
            FormState::Editing | FormState::Error { .. } => {}
            FormState::Submitting => return Err(AppError::OperationPending),
            FormState::Idle | FormState::Success => {
                return Err(AppError::InternalServerError(anyhow::anyhow!(
                    "formulário de setor enviado sem estar aberto"
                )));
            }
        }
        self.state = FormState::Editing;

        self.check_required()?;
        let parent = self.chosen_parent();
        validate_parent(forest, self.editing_id(), parent.as_deref())?;

        let name = self.input.name.trim().to_string();
        let submission = match &self.mode {
            FormMode::Create => SectorSubmission::Create(CreateSectorPayload {
                name,
                code: filled(&self.input.code),
                description: filled(&self.input.description),
                parent_id: parent,
                manager_id: filled(&self.input.manager_id),
            }),
            FormMode::Edit { sector_id } => SectorSubmission::Update {
                sector_id: sector_id.clone(),
                payload: UpdateSectorPayload {
                    name,
                    code: patch(&self.input.code),
                    description: patch(&self.input.description),
                    parent_id: patch(&self.input.parent_id),
                    manager_id: patch(&self.input.manager_id),
                },
            },
        };

        self.state = FormState::Submitting;
        Ok(submission)
    }

    /// `Submitting -> Success | Error`.
    pub fn complete<T>(&mut self, result: &Result<T, AppError>) {
        self.state = match result {
            Ok(_) => FormState::Success,
            Err(e) => FormState::Error { message: e.to_string() },
        };
    }

    /// Fecha o diálogo depois do sucesso: `Success -> Idle`, campos limpos.
    pub fn close(&mut self) {
        self.input = SectorFormInput::default();
        self.state = FormState::Idle;
    }
}
