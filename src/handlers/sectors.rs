// src/handlers/sectors.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentSession, i18n::Locale},
    models::{
        sector::{
            AddMemberInput, DeactivationPreview, RosterView, Sector, SectorFormInput, SectorOption,
            SectorRow,
        },
        Confirmation,
    },
    services::{
        sector_form::{FormMode, SectorForm},
        sector_tree::parent_candidates,
        tree_view::{dispatch, render, ActionIntent, SectorAction, TreeView},
    },
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActionRequest {
    pub action: SectorAction,
}

/// O que o navegador deve abrir depois de um clique no menu do nó.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ActionOutcome {
    #[serde(rename_all = "camelCase")]
    Form {
        mode: FormMode,
        input: SectorFormInput,
        parent_options: Vec<SectorOption>,
    },
    Roster { roster: RosterView },
    Deactivation { preview: DeactivationPreview },
    // Ação fora do menu deste nó (ex.: desativar um setor inativo)
    Unavailable { action: SectorAction },
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OptionsQuery {
    /// Setor em edição: ele e seus descendentes ficam de fora.
    pub editing: Option<String>,
}

// ---
// Árvore
// ---

// GET /api/sectors/tree
#[utoipa::path(
    get,
    path = "/api/sectors/tree",
    tag = "Sectors",
    responses(
        (status = 200, description = "Árvore de setores pronta para desenhar", body = TreeView),
        (status = 303, description = "Sessão expirada")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_tree(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
) -> Result<Json<TreeView>, ApiError> {
    let forest = app_state
        .sector_service(&session)
        .tree()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(session.with_tree_view(|state| render(&forest, state))))
}

// POST /api/sectors/tree/{id}/toggle
#[utoipa::path(
    post,
    path = "/api/sectors/tree/{id}/toggle",
    tag = "Sectors",
    params(("id" = String, Path, description = "ID do setor")),
    responses(
        (status = 200, description = "Árvore com o nó expandido/recolhido", body = TreeView)
    ),
    security(("session_cookie" = []))
)]
pub async fn toggle_node(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<TreeView>, ApiError> {
    let forest = app_state
        .sector_service(&session)
        .tree()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let view = session.with_tree_view(|state| {
        state.toggle(&id);
        render(&forest, state)
    });
    Ok(Json(view))
}

// POST /api/sectors/tree/reset
#[utoipa::path(
    post,
    path = "/api/sectors/tree/reset",
    tag = "Sectors",
    responses(
        (status = 200, description = "Árvore com todos os nós expandidos", body = TreeView)
    ),
    security(("session_cookie" = []))
)]
pub async fn reset_tree(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
) -> Result<Json<TreeView>, ApiError> {
    let forest = app_state
        .sector_service(&session)
        .tree()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let view = session.with_tree_view(|state| {
        state.reset();
        render(&forest, state)
    });
    Ok(Json(view))
}

// POST /api/sectors/{id}/actions
#[utoipa::path(
    post,
    path = "/api/sectors/{id}/actions",
    tag = "Sectors",
    params(("id" = String, Path, description = "ID do setor")),
    request_body = ActionRequest,
    responses(
        (status = 200, description = "Diálogo a abrir para a ação escolhida", body = ActionOutcome),
        (status = 404, description = "Setor não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn run_action(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionOutcome>, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);
    let sectors = app_state.sector_service(&session);
    let forest = sectors.tree().await.map_err(to_api)?;

    let mut intents: Vec<ActionIntent> = Vec::new();
    let offered = dispatch(&forest, &id, request.action, &mut intents).map_err(to_api)?;
    let intent = match intents.pop() {
        Some(intent) if offered => intent,
        _ => return Ok(Json(ActionOutcome::Unavailable { action: request.action })),
    };

    let outcome = match intent {
        ActionIntent::Edit(node) => {
            let form = SectorForm::open_edit(&node);
            ActionOutcome::Form {
                mode: form.mode().clone(),
                input: form.input().clone(),
                parent_options: parent_candidates(&forest, Some(&node.id)),
            }
        }
        ActionIntent::AddChild(parent_id) => {
            let form = SectorForm::open_create(Some(&parent_id));
            ActionOutcome::Form {
                mode: form.mode().clone(),
                input: form.input().clone(),
                parent_options: parent_candidates(&forest, None),
            }
        }
        ActionIntent::ManageMembers(sector_id) => {
            let roster = app_state
                .roster_service(&session)
                .view(&sector_id)
                .await
                .map_err(to_api)?;
            ActionOutcome::Roster { roster }
        }
        ActionIntent::Deactivate(node) => {
            let preview = sectors.deactivation_preview(&node.id).await.map_err(to_api)?;
            ActionOutcome::Deactivation { preview }
        }
    };

    Ok(Json(outcome))
}

// ---
// Lista, opções e formulário
// ---

// GET /api/sectors
#[utoipa::path(
    get,
    path = "/api/sectors",
    tag = "Sectors",
    responses(
        (status = 200, description = "Setores em pré-ordem, sem os filhos aninhados", body = Vec<SectorRow>)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_sectors(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<SectorRow>>, ApiError> {
    let rows = app_state
        .sector_service(&session)
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// GET /api/sectors/options
#[utoipa::path(
    get,
    path = "/api/sectors/options",
    tag = "Sectors",
    params(OptionsQuery),
    responses(
        (status = 200, description = "Opções recuadas para o seletor de setor pai", body = Vec<SectorOption>)
    ),
    security(("session_cookie" = []))
)]
pub async fn sector_options(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Query(query): Query<OptionsQuery>,
) -> Result<Json<Vec<SectorOption>>, ApiError> {
    let options = app_state
        .sector_service(&session)
        .parent_options(query.editing.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(options))
}

// POST /api/sectors
#[utoipa::path(
    post,
    path = "/api/sectors",
    tag = "Sectors",
    request_body = SectorFormInput,
    responses(
        (status = 201, description = "Setor criado", body = Sector),
        (status = 400, description = "Nome em branco ou setor pai inválido")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_sector(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Json(input): Json<SectorFormInput>,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = SectorForm::with_input(FormMode::Create, input);
    let sector = app_state
        .sector_service(&session)
        .submit(&mut form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(sector)))
}

// PATCH /api/sectors/{id}
#[utoipa::path(
    patch,
    path = "/api/sectors/{id}",
    tag = "Sectors",
    params(("id" = String, Path, description = "ID do setor")),
    request_body = SectorFormInput,
    responses(
        (status = 200, description = "Setor atualizado", body = Sector),
        (status = 400, description = "Nome em branco, auto-referência ou ciclo")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_sector(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Json(input): Json<SectorFormInput>,
) -> Result<Json<Sector>, ApiError> {
    let mut form = SectorForm::with_input(FormMode::Edit { sector_id: id }, input);
    let sector = app_state
        .sector_service(&session)
        .submit(&mut form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(sector))
}

// ---
// Desativação
// ---

// GET /api/sectors/{id}/deactivation
#[utoipa::path(
    get,
    path = "/api/sectors/{id}/deactivation",
    tag = "Sectors",
    params(("id" = String, Path, description = "ID do setor")),
    responses(
        (status = 200, description = "Aviso de sub-setores ativos antes de confirmar", body = DeactivationPreview),
        (status = 404, description = "Setor não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn deactivation_preview(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<DeactivationPreview>, ApiError> {
    let preview = app_state
        .sector_service(&session)
        .deactivation_preview(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(preview))
}

// DELETE /api/sectors/{id}?confirm=true
#[utoipa::path(
    delete,
    path = "/api/sectors/{id}",
    tag = "Sectors",
    params(("id" = String, Path, description = "ID do setor"), Confirmation),
    responses(
        (status = 204, description = "Setor desativado (sub-setores intocados)"),
        (status = 428, description = "Falta a confirmação")
    ),
    security(("session_cookie" = []))
)]
pub async fn deactivate_sector(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Query(confirmation): Query<Confirmation>,
) -> Result<StatusCode, ApiError> {
    app_state
        .sector_service(&session)
        .deactivate(&id, confirmation)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Membros do setor
// ---

// GET /api/sectors/{id}/members
#[utoipa::path(
    get,
    path = "/api/sectors/{id}/members",
    tag = "Sectors",
    params(("id" = String, Path, description = "ID do setor")),
    responses(
        (status = 200, description = "Membros do setor e usuários disponíveis", body = RosterView)
    ),
    security(("session_cookie" = []))
)]
pub async fn get_roster(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<RosterView>, ApiError> {
    let roster = app_state
        .roster_service(&session)
        .view(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(roster))
}

// POST /api/sectors/{id}/members
#[utoipa::path(
    post,
    path = "/api/sectors/{id}/members",
    tag = "Sectors",
    params(("id" = String, Path, description = "ID do setor")),
    request_body = AddMemberInput,
    responses(
        (status = 201, description = "Membro adicionado"),
        (status = 400, description = "Nenhum membro selecionado"),
        (status = 409, description = "Já existe uma inclusão em andamento")
    ),
    security(("session_cookie" = []))
)]
pub async fn add_member(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Json(input): Json<AddMemberInput>,
) -> Result<StatusCode, ApiError> {
    app_state
        .roster_service(&session)
        .add_member(&id, input)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::CREATED)
}

// DELETE /api/sectors/{id}/members/{user_id}?confirm=true
#[utoipa::path(
    delete,
    path = "/api/sectors/{id}/members/{user_id}",
    tag = "Sectors",
    params(
        ("id" = String, Path, description = "ID do setor"),
        ("user_id" = String, Path, description = "ID do usuário"),
        Confirmation
    ),
    responses(
        (status = 204, description = "Membro removido"),
        (status = 409, description = "Já existe uma remoção em andamento"),
        (status = 428, description = "Falta a confirmação")
    ),
    security(("session_cookie" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentSession(session): CurrentSession,
    Path((id, user_id)): Path<(String, String)>,
    Query(confirmation): Query<Confirmation>,
) -> Result<StatusCode, ApiError> {
    app_state
        .roster_service(&session)
        .remove_member(&id, &user_id, confirmation)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
