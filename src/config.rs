// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;

use crate::{
    api::{ApiClient, SectorApi, SectorBackend},
    common::i18n::I18nStore,
    services::{
        auth::AuthService,
        roster_service::RosterService,
        sector_service::SectorService,
        session::{Session, SessionStore},
    },
};

const DEFAULT_API_URL: &str = "https://sign.protonjudi.com/api/v1";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub bind_addr: String,
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
    pub query_stale: Duration,
    pub http_timeout: Duration,
    pub session_store_path: Option<PathBuf>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_u64(name: &str, default: u64) -> anyhow::Result<u64> {
    match env::var(name) {
        Ok(raw) => raw.parse().with_context(|| format!("{name} deve ser um número inteiro")),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let session_secret = env::var("SESSION_SECRET").context("SESSION_SECRET deve ser definido")?;
        let ttl_hours = parse_u64("SESSION_TTL_HOURS", 168)?;

        Ok(Self {
            api_url: var_or("API_URL", DEFAULT_API_URL),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            session_secret,
            session_ttl: chrono::Duration::hours(ttl_hours as i64),
            query_stale: Duration::from_secs(parse_u64("QUERY_STALE_SECS", 30)?),
            http_timeout: Duration::from_secs(parse_u64("HTTP_TIMEOUT_SECS", 15)?),
            session_store_path: env::var("SESSION_STORE_PATH").ok().map(PathBuf::from),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub http: reqwest::Client,
    pub sessions: SessionStore,
    pub auth_service: AuthService,
    pub i18n_store: Arc<I18nStore>,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .context("Falha ao criar o cliente HTTP")?;

        let sessions =
            SessionStore::hydrate(settings.session_store_path.clone(), settings.query_stale).await?;
        tracing::info!("✅ {} sessão(ões) recarregada(s)", sessions.len().await);

        // --- Monta o gráfico de dependências ---
        let auth_service = AuthService::new(
            http.clone(),
            settings.api_url.clone(),
            settings.session_secret.clone(),
            settings.session_ttl,
            sessions.clone(),
        );

        Ok(Self {
            settings,
            http,
            sessions,
            auth_service,
            i18n_store: Arc::new(I18nStore::new()),
        })
    }

    pub fn client_for(&self, session: &Arc<Session>) -> ApiClient {
        self.auth_service.client_for(session.clone())
    }

    pub fn sector_backend(&self, session: &Arc<Session>) -> Arc<dyn SectorBackend> {
        Arc::new(SectorApi::new(self.client_for(session)))
    }

    pub fn sector_service(&self, session: &Arc<Session>) -> SectorService {
        SectorService::new(self.sector_backend(session), session.cache().clone())
    }

    pub fn roster_service(&self, session: &Arc<Session>) -> RosterService {
        RosterService::new(
            self.sector_backend(session),
            session.cache().clone(),
            session.roster_pending().clone(),
        )
    }
}
