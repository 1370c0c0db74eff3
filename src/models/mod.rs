pub mod api_token;
pub mod auth;
pub mod envelope;
pub mod organization;
pub mod sector;
pub mod settings;
pub mod template;

use serde::Deserialize;
use utoipa::IntoParams;

/// `?confirm=true` exigido pelas ações destrutivas.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Confirmation {
    #[serde(default)]
    pub confirm: bool,
}
