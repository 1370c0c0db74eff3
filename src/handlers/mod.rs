pub mod api_tokens;
pub mod auth;
pub mod envelopes;
pub mod organization;
pub mod sectors;
pub mod settings;
pub mod templates;
