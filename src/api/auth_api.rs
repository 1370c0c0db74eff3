// src/api/auth_api.rs

use reqwest::Client;

use crate::{
    api::client::{read_json, ApiClient},
    common::error::AppError,
    models::{
        auth::{LoginPayload, TokenPair, User},
        settings::{ChangePasswordPayload, UpdateProfilePayload},
    },
};

/// `POST /auth/login`: o único pedido feito sem sessão.
pub async fn login(http: &Client, base_url: &str, payload: &LoginPayload) -> Result<TokenPair, AppError> {
    let url = format!("{}/auth/login", base_url.trim_end_matches('/'));
    let response = http.post(url).json(payload).send().await?;
    read_json(response).await
}

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn me(&self) -> Result<User, AppError> {
        self.client.get("/auth/me").await
    }

    pub async fn update_profile(&self, payload: &UpdateProfilePayload) -> Result<User, AppError> {
        self.client.patch("/users/me", payload).await
    }

    pub async fn change_password(&self, payload: &ChangePasswordPayload) -> Result<(), AppError> {
        self.client
            .post::<serde_json::Value, _>("/auth/change-password", payload)
            .await?;
        Ok(())
    }
}
