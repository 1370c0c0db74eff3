// src/api/sector_api.rs

use async_trait::async_trait;

use crate::{
    api::client::ApiClient,
    common::error::AppError,
    models::sector::{
        AddMemberPayload, CreateSectorPayload, OrganizationMember, Sector, SectorMember,
        UpdateSectorPayload,
    },
};

/// As chamadas de setor que a API remota oferece.
#[async_trait]
pub trait SectorBackend: Send + Sync {
    async fn tree(&self) -> Result<Vec<Sector>, AppError>;
    async fn create(&self, payload: &CreateSectorPayload) -> Result<Sector, AppError>;
    async fn update(&self, id: &str, payload: &UpdateSectorPayload) -> Result<Sector, AppError>;
    // Desativação lógica: a API mantém o registro com isActive = false
    async fn deactivate(&self, id: &str) -> Result<(), AppError>;
    async fn members(&self, sector_id: &str) -> Result<Vec<SectorMember>, AppError>;
    async fn add_member(&self, sector_id: &str, payload: &AddMemberPayload) -> Result<(), AppError>;
    async fn remove_member(&self, sector_id: &str, user_id: &str) -> Result<(), AppError>;
    async fn organization_members(&self) -> Result<Vec<OrganizationMember>, AppError>;
}

#[derive(Clone)]
pub struct SectorApi {
    client: ApiClient,
}

impl SectorApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SectorBackend for SectorApi {
    async fn tree(&self) -> Result<Vec<Sector>, AppError> {
        self.client.get("/sectors/tree").await
    }

    async fn create(&self, payload: &CreateSectorPayload) -> Result<Sector, AppError> {
        self.client.post("/sectors", payload).await
    }

    async fn update(&self, id: &str, payload: &UpdateSectorPayload) -> Result<Sector, AppError> {
        self.client.patch(&format!("/sectors/{id}"), payload).await
    }

    async fn deactivate(&self, id: &str) -> Result<(), AppError> {
        self.client.delete::<serde_json::Value>(&format!("/sectors/{id}")).await?;
        Ok(())
    }

    async fn members(&self, sector_id: &str) -> Result<Vec<SectorMember>, AppError> {
        self.client.get(&format!("/sectors/{sector_id}/users")).await
    }

    async fn add_member(&self, sector_id: &str, payload: &AddMemberPayload) -> Result<(), AppError> {
        self.client
            .post::<serde_json::Value, _>(&format!("/sectors/{sector_id}/users"), payload)
            .await?;
        Ok(())
    }

    async fn remove_member(&self, sector_id: &str, user_id: &str) -> Result<(), AppError> {
        self.client
            .delete::<serde_json::Value>(&format!("/sectors/{sector_id}/users/{user_id}"))
            .await?;
        Ok(())
    }

    async fn organization_members(&self) -> Result<Vec<OrganizationMember>, AppError> {
        self.client.get("/organizations/me/members").await
    }
}
