// src/services/tree_view.rs

//! A árvore de setores como o navegador a desenha: recuo por profundidade,
//! linhas conectoras, ícone, menu de ações e expandir/recolher por nó.
//!
//! O estado de expansão é um mapa id -> bool guardado na sessão. Ele não é
//! persistido: uma sessão nova (ou um `reset`) volta tudo para expandido.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    models::sector::Sector,
    services::sector_tree::find_node,
};

/// Deslocamento horizontal por nível, em px.
pub const INDENT_UNIT: u32 = 24;
/// Margem fixa antes do primeiro nível, em px.
pub const INDENT_BASE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum TreeIcon {
    // Raiz (profundidade 0)
    Organization,
    // Nó com filhos
    Branch,
    // Folha
    Leaf,
}

impl TreeIcon {
    fn for_node(node: &Sector, depth: usize) -> Self {
        if depth == 0 {
            TreeIcon::Organization
        } else if node.has_children() {
            TreeIcon::Branch
        } else {
            TreeIcon::Leaf
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SectorAction {
    Edit,
    AddChild,
    ManageMembers,
    Deactivate,
}

/// Ações oferecidas no menu do nó. "Desativar" só aparece para setores ativos.
pub fn actions_for(node: &Sector) -> Vec<SectorAction> {
    let mut actions = vec![SectorAction::Edit, SectorAction::AddChild, SectorAction::ManageMembers];
    if node.is_active {
        actions.push(SectorAction::Deactivate);
    }
    actions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub left: u32,
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub depth: usize,
    pub padding_left: u32,
    pub connector: Option<Connector>,
    pub icon: TreeIcon,
    pub has_children: bool,
    pub expanded: bool,
    pub is_active: bool,
    #[schema(example = "3 membros")]
    pub members_label: String,
    pub actions: Vec<SectorAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TreeView {
    Empty { title: String, message: String },
    Tree { rows: Vec<TreeRow> },
}

#[derive(Debug, Clone, Default)]
pub struct TreeViewState {
    expanded: HashMap<String, bool>,
}

impl TreeViewState {
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.get(id).copied().unwrap_or(true)
    }

    /// Inverte o nó e devolve o novo valor.
    pub fn toggle(&mut self, id: &str) -> bool {
        let next = !self.is_expanded(id);
        self.expanded.insert(id.to_string(), next);
        next
    }

    pub fn reset(&mut self) {
        self.expanded.clear();
    }
}

fn members_label(count: u32) -> String {
    if count == 1 {
        "1 membro".to_string()
    } else {
        format!("{count} membros")
    }
}

/// Desenha a floresta inteira, ou o convite para criar o primeiro setor.
pub fn render(nodes: &[Sector], state: &TreeViewState) -> TreeView {
    if nodes.is_empty() {
        return TreeView::Empty {
            title: "Nenhum setor criado".to_string(),
            message: "Comece criando o primeiro setor da organização.".to_string(),
        };
    }

    let mut rows = Vec::new();
    render_level(nodes, 0, state, &mut rows);
    TreeView::Tree { rows }
}

fn render_level(nodes: &[Sector], depth: usize, state: &TreeViewState, rows: &mut Vec<TreeRow>) {
    for (index, node) in nodes.iter().enumerate() {
        let expanded = state.is_expanded(&node.id);
        rows.push(render_node(node, depth, index + 1 == nodes.len(), expanded));

        // Filhos de um nó recolhido não são emitidos
        if node.has_children() && expanded {
            render_level(&node.children, depth + 1, state, rows);
        }
    }
}

fn render_node(node: &Sector, depth: usize, is_last: bool, expanded: bool) -> TreeRow {
    let offset = depth as u32;
    let connector = (depth > 0).then(|| Connector {
        left: (offset - 1) * INDENT_UNIT + INDENT_BASE,
        is_last,
    });

    TreeRow {
        id: node.id.clone(),
        name: node.name.clone(),
        code: node.code.clone().filter(|c| !c.is_empty()),
        depth,
        padding_left: offset * INDENT_UNIT + INDENT_BASE,
        connector,
        icon: TreeIcon::for_node(node, depth),
        has_children: node.has_children(),
        expanded,
        is_active: node.is_active,
        members_label: members_label(node.user_count),
        actions: actions_for(node),
    }
}

// ---
// Callbacks
// ---

/// Quem cuida dos diálogos e mutações. A árvore só sinaliza a intenção.
pub trait TreeActions {
    fn on_edit(&mut self, node: &Sector);
    fn on_add_child(&mut self, parent_id: &str);
    fn on_manage_members(&mut self, sector_id: &str);
    fn on_deactivate(&mut self, node: &Sector);
}

/// Encaminha um clique do menu para o callback certo.
///
/// Devolve `false` quando a ação não está disponível para o nó (por exemplo,
/// desativar um setor que já está inativo).
pub fn dispatch<A>(
    nodes: &[Sector],
    sector_id: &str,
    action: SectorAction,
    handler: &mut A,
) -> Result<bool, AppError>
where
    A: TreeActions + ?Sized,
{
    let node = find_node(nodes, sector_id)
        .ok_or_else(|| AppError::SectorNotFound(sector_id.to_string()))?;

    if !actions_for(node).contains(&action) {
        return Ok(false);
    }

    match action {
        SectorAction::Edit => handler.on_edit(node),
        SectorAction::AddChild => handler.on_add_child(&node.id),
        SectorAction::ManageMembers => handler.on_manage_members(&node.id),
        SectorAction::Deactivate => handler.on_deactivate(node),
    }
    Ok(true)
}

/// Intenção capturada de um clique, resolvida depois pelo handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionIntent {
    Edit(Sector),
    AddChild(String),
    ManageMembers(String),
    Deactivate(Sector),
}

impl TreeActions for Vec<ActionIntent> {
    fn on_edit(&mut self, node: &Sector) {
        self.push(ActionIntent::Edit(node.clone()));
    }

    fn on_add_child(&mut self, parent_id: &str) {
        self.push(ActionIntent::AddChild(parent_id.to_string()));
    }

    fn on_manage_members(&mut self, sector_id: &str) {
        self.push(ActionIntent::ManageMembers(sector_id.to_string()));
    }

    fn on_deactivate(&mut self, node: &Sector) {
        self.push(ActionIntent::Deactivate(node.clone()));
    }
}
