// src/api.rs

// Um gateway por recurso da API de assinaturas
pub mod auth_api;
pub mod client;
pub mod envelope_api;
pub mod organization_api;
pub mod sector_api;
pub mod template_api;
pub mod token_api;

pub use auth_api::AuthApi;
pub use client::ApiClient;
pub use envelope_api::EnvelopeApi;
pub use organization_api::OrganizationApi;
pub use sector_api::{SectorApi, SectorBackend};
pub use template_api::TemplateApi;
pub use token_api::TokenApi;
