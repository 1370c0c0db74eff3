// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 3, message = "Nome deve ter no mínimo 3 caracteres"))]
    pub name: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Nova senha deve ter no mínimo 8 caracteres"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Senhas não conferem"))]
    pub confirm_password: String,
}

// O que vai para POST /auth/change-password (sem a confirmação)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

impl From<ChangePasswordInput> for ChangePasswordPayload {
    fn from(input: ChangePasswordInput) -> Self {
        Self { current_password: input.current_password, new_password: input.new_password }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_must_match_new_password() {
        let input = ChangePasswordInput {
            current_password: "segredo1".into(),
            new_password: "novasenha123".into(),
            confirm_password: "outracoisa123".into(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));
    }
}
