// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::common::error::SESSION_COOKIE;
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login_screen,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,

        // --- Sectors ---
        handlers::sectors::get_tree,
        handlers::sectors::toggle_node,
        handlers::sectors::reset_tree,
        handlers::sectors::run_action,
        handlers::sectors::list_sectors,
        handlers::sectors::sector_options,
        handlers::sectors::create_sector,
        handlers::sectors::update_sector,
        handlers::sectors::deactivation_preview,
        handlers::sectors::deactivate_sector,
        handlers::sectors::get_roster,
        handlers::sectors::add_member,
        handlers::sectors::remove_member,

        // --- Organization ---
        handlers::organization::get_organization,
        handlers::organization::update_organization,
        handlers::organization::list_members,
        handlers::organization::create_member,
        handlers::organization::update_member_role,
        handlers::organization::remove_member,

        // --- Envelopes ---
        handlers::envelopes::list_envelopes,
        handlers::envelopes::get_envelope,
        handlers::envelopes::create_envelope,
        handlers::envelopes::activate_envelope,
        handlers::envelopes::cancel_envelope,
        handlers::envelopes::resend_notification,

        // --- Templates ---
        handlers::templates::list_templates,
        handlers::templates::delete_template,

        // --- API Tokens ---
        handlers::api_tokens::list_tokens,
        handlers::api_tokens::create_token,
        handlers::api_tokens::revoke_token,
        handlers::api_tokens::delete_token,

        // --- Settings ---
        handlers::settings::update_profile,
        handlers::settings::change_password,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::OrganizationSummary,
            models::auth::LoginPayload,
            models::auth::LoginResponse,
            models::auth::LoginScreen,

            // --- Sectors ---
            models::sector::Sector,
            models::sector::SectorRow,
            models::sector::SectorOption,
            models::sector::UserSummary,
            models::sector::OrganizationMember,
            models::sector::SectorMember,
            models::sector::RosterView,
            models::sector::SectorFormInput,
            models::sector::AddMemberInput,
            models::sector::DeactivationPreview,
            services::tree_view::TreeView,
            services::tree_view::TreeRow,
            services::tree_view::TreeIcon,
            services::tree_view::Connector,
            services::tree_view::SectorAction,
            services::sector_form::FormMode,
            services::sector_form::FormState,
            handlers::sectors::ActionRequest,
            handlers::sectors::ActionOutcome,

            // --- Organization ---
            models::organization::OrganizationStats,
            models::organization::MemberRole,
            models::organization::SectorRef,
            models::organization::Member,
            models::organization::CreateMemberPayload,
            models::organization::UpdateRolePayload,
            models::organization::UpdateOrganizationPayload,

            // --- Envelopes ---
            models::envelope::EnvelopeStatus,
            models::envelope::SignerStatus,
            models::envelope::EnvelopeSummary,
            models::envelope::Signer,
            models::envelope::EnvelopeDocument,
            models::envelope::Envelope,
            models::envelope::SignerInput,
            models::envelope::CreateEnvelopeInput,

            // --- Templates ---
            models::template::DocumentTemplate,

            // --- API Tokens ---
            models::api_token::ApiToken,
            models::api_token::CreatedApiToken,
            models::api_token::CreateApiTokenPayload,

            // --- Settings ---
            models::settings::UpdateProfilePayload,
            models::settings::ChangePasswordInput,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout e sessão do painel"),
        (name = "Sectors", description = "Árvore de setores, formulário e membros"),
        (name = "Organization", description = "Dados e membros da organização"),
        (name = "Envelopes", description = "Envelopes e signatários"),
        (name = "Templates", description = "Modelos de documento"),
        (name = "API Tokens", description = "Tokens de integração"),
        (name = "Settings", description = "Perfil e senha do usuário")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
    }
}
