// src/api/token_api.rs

use crate::{
    api::client::ApiClient,
    common::error::AppError,
    models::api_token::{ApiToken, CreateApiTokenPayload, CreatedApiToken},
};

#[derive(Clone)]
pub struct TokenApi {
    client: ApiClient,
}

impl TokenApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<ApiToken>, AppError> {
        self.client.get("/api-tokens").await
    }

    // O token em texto puro só aparece nesta resposta
    pub async fn create(&self, payload: &CreateApiTokenPayload) -> Result<CreatedApiToken, AppError> {
        self.client.post("/api-tokens", payload).await
    }

    pub async fn revoke(&self, id: &str) -> Result<(), AppError> {
        self.client
            .post_empty::<serde_json::Value>(&format!("/api-tokens/{id}/revoke"))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.client.delete::<serde_json::Value>(&format!("/api-tokens/{id}")).await?;
        Ok(())
    }
}
