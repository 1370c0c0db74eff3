// src/api/template_api.rs

use crate::{
    api::client::ApiClient,
    common::error::AppError,
    models::template::{DocumentTemplate, TemplateFilter},
};

#[derive(Clone)]
pub struct TemplateApi {
    client: ApiClient,
}

impl TemplateApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &TemplateFilter) -> Result<Vec<DocumentTemplate>, AppError> {
        match filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(search) => {
                self.client
                    .get_query("/document-templates", &[("search", search)])
                    .await
            }
            None => self.client.get("/document-templates").await,
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.client
            .delete::<serde_json::Value>(&format!("/document-templates/{id}"))
            .await?;
        Ok(())
    }
}
