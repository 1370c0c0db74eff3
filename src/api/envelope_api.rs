// src/api/envelope_api.rs

use crate::{
    api::client::ApiClient,
    common::error::AppError,
    models::envelope::{CreateEnvelopePayload, Envelope, EnvelopeFilter, EnvelopeSummary},
};

#[derive(Clone)]
pub struct EnvelopeApi {
    client: ApiClient,
}

impl EnvelopeApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &EnvelopeFilter) -> Result<Vec<EnvelopeSummary>, AppError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query.push(("search", search));
        }
        if let Some(status) = filter.status {
            query.push(("status", status.as_query()));
        }
        self.client.get_query("/envelopes", &query).await
    }

    pub async fn get(&self, id: &str) -> Result<Envelope, AppError> {
        self.client.get(&format!("/envelopes/{id}")).await
    }

    pub async fn create(&self, payload: &CreateEnvelopePayload) -> Result<Envelope, AppError> {
        self.client.post("/envelopes", payload).await
    }

    pub async fn activate(&self, id: &str) -> Result<Envelope, AppError> {
        self.client.post_empty(&format!("/envelopes/{id}/activate")).await
    }

    pub async fn cancel(&self, id: &str) -> Result<Envelope, AppError> {
        self.client.post_empty(&format!("/envelopes/{id}/cancel")).await
    }

    pub async fn resend_notification(&self, signer_id: &str) -> Result<(), AppError> {
        self.client
            .post_empty::<serde_json::Value>(&format!("/signers/{signer_id}/resend-notification"))
            .await?;
        Ok(())
    }
}
