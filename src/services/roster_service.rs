// src/services/roster_service.rs

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use crate::{
    api::SectorBackend,
    common::error::AppError,
    models::{
        sector::{AddMemberInput, AddMemberPayload, OrganizationMember, RosterView, SectorMember},
        Confirmation,
    },
    services::query_cache::{key, QueryCache, QueryKey},
};

// O pool de membros atribuíveis mora sob o prefixo "organization",
// mas numa chave própria: o formato difere da lista da página de membros.
pub const ASSIGNABLE_MEMBERS_KEY: &[&str] = &["organization", "members", "assignable"];

pub fn roster_key(sector_id: &str) -> QueryKey {
    key(&["sectors", sector_id, "members"])
}

/// Membros da organização que ainda não estão no setor (diferença por `user_id`).
pub fn available_members(
    org_members: &[OrganizationMember],
    roster: &[SectorMember],
) -> Vec<OrganizationMember> {
    let taken: HashSet<&str> = roster.iter().map(|entry| entry.user_id.as_str()).collect();
    org_members
        .iter()
        .filter(|member| !taken.contains(member.user_id.as_str()))
        .cloned()
        .collect()
}

// ---
// Operações pendentes
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingKind {
    Add,
    Remove,
}

/// Uma inclusão e uma remoção em andamento por setor, no máximo.
///
/// É só um freio do lado do painel contra clique duplo; a API continua
/// responsável por qualquer deduplicação de verdade.
#[derive(Debug, Clone, Default)]
pub struct RosterPending {
    inflight: Arc<Mutex<HashSet<(String, PendingKind)>>>,
}

impl RosterPending {
    pub fn begin(&self, sector_id: &str, kind: PendingKind) -> Result<PendingGuard, AppError> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        if !inflight.insert((sector_id.to_string(), kind)) {
            return Err(AppError::OperationPending);
        }
        Ok(PendingGuard {
            inflight: self.inflight.clone(),
            entry: Some((sector_id.to_string(), kind)),
        })
    }

    pub fn is_pending(&self, sector_id: &str, kind: PendingKind) -> bool {
        self.inflight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(sector_id.to_string(), kind))
    }
}

/// Libera a marca de pendência ao sair de escopo, com sucesso ou erro.
pub struct PendingGuard {
    inflight: Arc<Mutex<HashSet<(String, PendingKind)>>>,
    entry: Option<(String, PendingKind)>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            self.inflight.lock().unwrap_or_else(|e| e.into_inner()).remove(&entry);
        }
    }
}

// ---
// Serviço
// ---

#[derive(Clone)]
pub struct RosterService {
    backend: Arc<dyn SectorBackend>,
    cache: QueryCache,
    pending: RosterPending,
}

impl RosterService {
    pub fn new(backend: Arc<dyn SectorBackend>, cache: QueryCache, pending: RosterPending) -> Self {
        Self { backend, cache, pending }
    }

    pub async fn members(&self, sector_id: &str) -> Result<Vec<SectorMember>, AppError> {
        let backend = self.backend.clone();
        let id = sector_id.to_string();
        self.cache
            .fetch(roster_key(sector_id), move || {
                let backend = backend.clone();
                let id = id.clone();
                async move { backend.members(&id).await }
            })
            .await
    }

    pub async fn organization_members(&self) -> Result<Vec<OrganizationMember>, AppError> {
        let backend = self.backend.clone();
        self.cache
            .fetch(key(ASSIGNABLE_MEMBERS_KEY), move || {
                let backend = backend.clone();
                async move { backend.organization_members().await }
            })
            .await
    }

    /// O painel de membros: lista atual, contagem e quem ainda pode entrar.
    pub async fn view(&self, sector_id: &str) -> Result<RosterView, AppError> {
        let members = self.members(sector_id).await?;
        let org_members = self.organization_members().await?;

        Ok(RosterView {
            sector_id: sector_id.to_string(),
            user_count: members.len(),
            available: available_members(&org_members, &members),
            add_pending: self.pending.is_pending(sector_id, PendingKind::Add),
            remove_pending: self.pending.is_pending(sector_id, PendingKind::Remove),
            members,
        })
    }

    pub async fn add_member(&self, sector_id: &str, input: AddMemberInput) -> Result<(), AppError> {
        let user_id = input.user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::MemberRequired);
        }

        let _guard = self.pending.begin(sector_id, PendingKind::Add)?;
        let payload = AddMemberPayload {
            user_id: user_id.to_string(),
            is_primary: input.is_primary,
            role: input.role.filter(|r| !r.trim().is_empty()),
        };
        self.backend.add_member(sector_id, &payload).await?;

        tracing::info!("👤 Usuário {} adicionado ao setor {}", payload.user_id, sector_id);
        // userCount mudou: a árvore e a lista do setor precisam ser relidas
        self.cache.invalidate(&["sectors"]);
        Ok(())
    }

    pub async fn remove_member(
        &self,
        sector_id: &str,
        user_id: &str,
        confirmation: Confirmation,
    ) -> Result<(), AppError> {
        if !confirmation.confirm {
            return Err(AppError::ConfirmationRequired);
        }

        let _guard = self.pending.begin(sector_id, PendingKind::Remove)?;
        self.backend.remove_member(sector_id, user_id).await?;

        tracing::info!("👤 Usuário {} removido do setor {}", user_id, sector_id);
        self.cache.invalidate(&["sectors"]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::fixtures::{org_member, sector_member, FakeBackend};

    fn service(backend: Arc<FakeBackend>) -> RosterService {
        RosterService::new(backend, QueryCache::new(Duration::from_secs(60)), RosterPending::default())
    }

    #[test]
    fn available_is_set_difference_by_user_id() {
        let org = vec![org_member("u1"), org_member("u2")];
        let roster = vec![sector_member("s1", "u1")];

        let ids: Vec<String> = available_members(&org, &roster).into_iter().map(|m| m.user_id).collect();
        assert_eq!(ids, vec!["u2"]);
        assert_eq!(available_members(&org, &[]), org);
    }

    #[test]
    fn pending_flag_blocks_duplicates_until_dropped() {
        let pending = RosterPending::default();
        let guard = pending.begin("s1", PendingKind::Add).unwrap();
        assert!(matches!(pending.begin("s1", PendingKind::Add), Err(AppError::OperationPending)));
        // Remoção e outros setores seguem livres
        let _remove = pending.begin("s1", PendingKind::Remove).unwrap();
        let _other = pending.begin("s2", PendingKind::Add).unwrap();

        drop(guard);
        assert!(!pending.is_pending("s1", PendingKind::Add));
        assert!(pending.begin("s1", PendingKind::Add).is_ok());
    }

    #[tokio::test]
    async fn blank_member_is_rejected_without_backend_call() {
        let backend = Arc::new(FakeBackend::default());
        let result = service(backend.clone())
            .add_member("s1", AddMemberInput { user_id: "  ".into(), ..AddMemberInput::default() })
            .await;

        assert!(matches!(result, Err(AppError::MemberRequired)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn view_lists_roster_count_and_available_pool() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_roster("s1", vec![sector_member("s1", "u1")]);
        backend.set_org_members(vec![org_member("u1"), org_member("u2")]);

        let view = service(backend).view("s1").await.unwrap();
        assert_eq!(view.user_count, 1);
        assert_eq!(view.available.len(), 1);
        assert_eq!(view.available[0].user_id, "u2");
        assert!(!view.add_pending);
    }

    #[tokio::test]
    async fn add_member_sends_payload_and_invalidates_sectors() {
        let backend = Arc::new(FakeBackend::default());
        let roster = service(backend.clone());
        roster.members("s1").await.unwrap();

        roster
            .add_member(
                "s1",
                AddMemberInput { user_id: "u2".into(), is_primary: true, role: Some("Analista".into()) },
            )
            .await
            .unwrap();

        assert!(backend.calls().contains(&"POST /sectors/s1/users u2".to_string()));

        // A lista do setor é relida em background
        for _ in 0..100 {
            if backend.count("GET /sectors/s1/users") == 2 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("a lista do setor não foi relida");
    }

    #[tokio::test]
    async fn removal_requires_confirmation() {
        let backend = Arc::new(FakeBackend::default());
        let roster = service(backend.clone());

        let result = roster.remove_member("s1", "u1", Confirmation { confirm: false }).await;
        assert!(matches!(result, Err(AppError::ConfirmationRequired)));
        assert!(backend.calls().is_empty());

        roster.remove_member("s1", "u1", Confirmation { confirm: true }).await.unwrap();
        assert_eq!(backend.calls(), vec!["DELETE /sectors/s1/users/u1".to_string()]);
    }
}
