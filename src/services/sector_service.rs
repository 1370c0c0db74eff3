// src/services/sector_service.rs

use std::sync::Arc;

use crate::{
    api::SectorBackend,
    common::error::AppError,
    models::{
        sector::{DeactivationPreview, Sector, SectorOption, SectorRow},
        Confirmation,
    },
    services::{
        query_cache::{key, QueryCache},
        sector_form::{SectorForm, SectorSubmission},
        sector_tree::{
            active_children_count, find_node, flatten_for_listing, level_violations,
            parent_candidates,
        },
    },
};

pub const TREE_KEY: &[&str] = &["sectors", "tree"];

#[derive(Clone)]
pub struct SectorService {
    backend: Arc<dyn SectorBackend>,
    cache: QueryCache,
}

impl SectorService {
    pub fn new(backend: Arc<dyn SectorBackend>, cache: QueryCache) -> Self {
        Self { backend, cache }
    }

    /// A floresta de setores, via cache.
    pub async fn tree(&self) -> Result<Vec<Sector>, AppError> {
        let backend = self.backend.clone();
        self.cache
            .fetch(key(TREE_KEY), move || {
                let backend = backend.clone();
                async move {
                    let forest = backend.tree().await?;
                    for violation in level_violations(&forest) {
                        tracing::warn!(
                            "⚠️ Setor {} chegou com level {} (esperado {})",
                            violation.sector_id,
                            violation.found,
                            violation.expected
                        );
                    }
                    Ok::<_, AppError>(forest)
                }
            })
            .await
    }

    pub async fn find(&self, id: &str) -> Result<Sector, AppError> {
        let forest = self.tree().await?;
        find_node(&forest, id)
            .cloned()
            .ok_or_else(|| AppError::SectorNotFound(id.to_string()))
    }

    /// Visão em tabela (a hierarquia fica na coluna `level`).
    pub async fn list(&self) -> Result<Vec<SectorRow>, AppError> {
        let forest = self.tree().await?;
        Ok(flatten_for_listing(&forest).map(SectorRow::from).collect())
    }

    /// Opções do seletor de setor pai.
    pub async fn parent_options(&self, editing: Option<&str>) -> Result<Vec<SectorOption>, AppError> {
        let forest = self.tree().await?;
        Ok(parent_candidates(&forest, editing))
    }

    /// Envia o formulário (criação ou edição) e invalida tudo sob "sectors".
    pub async fn submit(&self, form: &mut SectorForm) -> Result<Sector, AppError> {
        // Nome em branco nunca chega à rede, nem para ler a árvore
        form.check_required()?;

        let forest = match form.chosen_parent() {
            Some(_) => self.tree().await?,
            None => Vec::new(),
        };
        let submission = form.submit(&forest)?;

        let result = match &submission {
            SectorSubmission::Create(payload) => self.backend.create(payload).await,
            SectorSubmission::Update { sector_id, payload } => {
                self.backend.update(sector_id, payload).await
            }
        };
        form.complete(&result);

        let sector = result?;
        match submission {
            SectorSubmission::Create(_) => tracing::info!("🏢 Setor criado: {}", sector.name),
            SectorSubmission::Update { sector_id, .. } => {
                tracing::info!("🏢 Setor atualizado: {}", sector_id)
            }
        }
        self.cache.invalidate(&["sectors"]);
        Ok(sector)
    }

    pub async fn deactivation_preview(&self, id: &str) -> Result<DeactivationPreview, AppError> {
        let sector = self.find(id).await?;
        Ok(preview(&sector))
    }

    /// Desativa só o setor pedido. Os sub-setores continuam como estão.
    pub async fn deactivate(&self, id: &str, confirmation: Confirmation) -> Result<(), AppError> {
        if !confirmation.confirm {
            return Err(AppError::ConfirmationRequired);
        }

        let sector = self.find(id).await?;
        let active_children = active_children_count(&sector);
        if active_children > 0 {
            tracing::warn!(
                "Setor {} desativado com {} sub-setor(es) ativo(s)",
                sector.id,
                active_children
            );
        }

        self.backend.deactivate(&sector.id).await?;
        tracing::info!("🗑️ Setor desativado: {}", sector.name);
        self.cache.invalidate(&["sectors"]);
        Ok(())
    }
}

fn preview(sector: &Sector) -> DeactivationPreview {
    let active_children = active_children_count(sector);
    DeactivationPreview {
        sector_id: sector.id.clone(),
        name: sector.name.clone(),
        active_children,
        warning: (active_children > 0).then(|| {
            format!("Atenção: Este setor possui {active_children} sub-setor(es) ativo(s).")
        }),
    }
}
