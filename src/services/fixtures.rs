// src/services/fixtures.rs

// Construtores usados pelos testes dos serviços.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    api::SectorBackend,
    common::error::AppError,
    models::sector::{
        AddMemberPayload, CreateSectorPayload, OrganizationMember, Sector, SectorMember,
        UpdateSectorPayload, UserSummary,
    },
};

pub fn sector(id: &str, level: i32, children: Vec<Sector>) -> Sector {
    Sector {
        id: id.to_string(),
        name: id.to_string(),
        code: None,
        description: None,
        level,
        path: None,
        parent_id: None,
        manager_id: None,
        is_active: true,
        user_count: 0,
        children,
    }
}

/// A -> [B, C -> [D]]
pub fn scenario_forest() -> Vec<Sector> {
    let mut forest = vec![sector(
        "A",
        0,
        vec![sector("B", 1, vec![]), sector("C", 1, vec![sector("D", 2, vec![])])],
    )];
    forest[0].children[0].parent_id = Some("A".into());
    forest[0].children[1].parent_id = Some("A".into());
    forest[0].children[1].children[0].parent_id = Some("C".into());
    forest
}

pub fn user(id: &str) -> UserSummary {
    UserSummary {
        id: id.to_string(),
        name: format!("Usuário {id}"),
        email: format!("{id}@empresa.com.br"),
    }
}

pub fn org_member(user_id: &str) -> OrganizationMember {
    OrganizationMember {
        id: format!("om-{user_id}"),
        user_id: user_id.to_string(),
        role: None,
        user: user(user_id),
    }
}

pub fn sector_member(sector_id: &str, user_id: &str) -> SectorMember {
    SectorMember {
        id: format!("sm-{sector_id}-{user_id}"),
        user_id: user_id.to_string(),
        sector_id: sector_id.to_string(),
        is_primary: false,
        role: None,
        user: user(user_id),
    }
}

/// API de setores em memória: devolve o que foi configurado e anota cada chamada.
#[derive(Default)]
pub struct FakeBackend {
    forest: Mutex<Vec<Sector>>,
    rosters: Mutex<HashMap<String, Vec<SectorMember>>>,
    org_members: Mutex<Vec<OrganizationMember>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    pub fn with_forest(forest: Vec<Sector>) -> Self {
        let backend = Self::default();
        *backend.forest.lock().unwrap() = forest;
        backend
    }

    pub fn set_roster(&self, sector_id: &str, roster: Vec<SectorMember>) {
        self.rosters.lock().unwrap().insert(sector_id.to_string(), roster);
    }

    pub fn set_org_members(&self, members: Vec<OrganizationMember>) {
        *self.org_members.lock().unwrap() = members;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SectorBackend for FakeBackend {
    async fn tree(&self) -> Result<Vec<Sector>, AppError> {
        self.record("GET /sectors/tree".into());
        Ok(self.forest.lock().unwrap().clone())
    }

    async fn create(&self, payload: &CreateSectorPayload) -> Result<Sector, AppError> {
        self.record(format!("POST /sectors {}", payload.name));
        let mut created = sector(&payload.name, 0, vec![]);
        created.parent_id = payload.parent_id.clone();
        Ok(created)
    }

    async fn update(&self, id: &str, payload: &UpdateSectorPayload) -> Result<Sector, AppError> {
        self.record(format!("PATCH /sectors/{id}"));
        let mut updated = sector(id, 0, vec![]);
        updated.name = payload.name.clone();
        Ok(updated)
    }

    async fn deactivate(&self, id: &str) -> Result<(), AppError> {
        self.record(format!("DELETE /sectors/{id}"));
        Ok(())
    }

    async fn members(&self, sector_id: &str) -> Result<Vec<SectorMember>, AppError> {
        self.record(format!("GET /sectors/{sector_id}/users"));
        Ok(self.rosters.lock().unwrap().get(sector_id).cloned().unwrap_or_default())
    }

    async fn add_member(&self, sector_id: &str, payload: &AddMemberPayload) -> Result<(), AppError> {
        self.record(format!("POST /sectors/{sector_id}/users {}", payload.user_id));
        Ok(())
    }

    async fn remove_member(&self, sector_id: &str, user_id: &str) -> Result<(), AppError> {
        self.record(format!("DELETE /sectors/{sector_id}/users/{user_id}"));
        Ok(())
    }

    async fn organization_members(&self) -> Result<Vec<OrganizationMember>, AppError> {
        self.record("GET /organizations/me/members".into());
        Ok(self.org_members.lock().unwrap().clone())
    }
}
