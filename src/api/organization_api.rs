// src/api/organization_api.rs

use crate::{
    api::client::ApiClient,
    common::error::AppError,
    models::organization::{
        CreateMemberPayload, Member, OrganizationStats, UpdateOrganizationPayload,
        UpdateRolePayload,
    },
};

#[derive(Clone)]
pub struct OrganizationApi {
    client: ApiClient,
}

impl OrganizationApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<OrganizationStats, AppError> {
        self.client.get("/organizations/me").await
    }

    pub async fn update(&self, payload: &UpdateOrganizationPayload) -> Result<OrganizationStats, AppError> {
        self.client.patch("/organizations/me", payload).await
    }

    pub async fn members(&self) -> Result<Vec<Member>, AppError> {
        self.client.get("/organizations/me/members").await
    }

    pub async fn create_member(&self, payload: &CreateMemberPayload) -> Result<Member, AppError> {
        self.client.post("/organizations/me/members", payload).await
    }

    pub async fn update_role(&self, member_id: &str, payload: &UpdateRolePayload) -> Result<Member, AppError> {
        self.client
            .patch(&format!("/organizations/me/members/{member_id}/role"), payload)
            .await
    }

    pub async fn remove_member(&self, member_id: &str) -> Result<(), AppError> {
        self.client
            .delete::<serde_json::Value>(&format!("/organizations/me/members/{member_id}"))
            .await?;
        Ok(())
    }
}
