// src/services/session.rs

//! A sessão do painel: o par de tokens da API remota e tudo o que o navegador
//! guardaria localmente (usuário atual, cache de consultas, estado da árvore).
//!
//! Ciclo de vida: carregada na inicialização, atualizada no login e no
//! refresh, limpa no logout ou num 401 irrecuperável.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex, RwLock},
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{sync::MutexGuard, task::JoinHandle};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{TokenPair, User},
    services::{
        query_cache::QueryCache, roster_service::RosterPending, tree_view::TreeViewState,
    },
};

#[derive(Debug, Clone, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    tokens: RwLock<Tokens>,
    user: RwLock<Option<User>>,
    // Serializa os refreshes concorrentes desta sessão
    refresh_lock: tokio::sync::Mutex<()>,
    cache: QueryCache,
    tree_view: Mutex<TreeViewState>,
    roster_pending: RosterPending,
}

impl Session {
    pub fn new(id: Uuid, stale_after: Duration) -> Self {
        Self::created(id, stale_after, Utc::now())
    }

    fn created(id: Uuid, stale_after: Duration, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            tokens: RwLock::new(Tokens::default()),
            user: RwLock::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
            cache: QueryCache::new(stale_after),
            tree_view: Mutex::new(TreeViewState::default()),
            roster_pending: RosterPending::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn get_token(&self) -> Option<String> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner()).access.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner()).refresh.clone()
    }

    /// Guarda o par novo. Se a API não mandar outro refresh token, o atual continua valendo.
    pub fn set_tokens(&self, pair: TokenPair) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.access = Some(pair.access_token);
        if let Some(refresh) = pair.refresh_token {
            tokens.refresh = Some(refresh);
        }
    }

    /// Esquece os tokens e tudo o que foi lido com eles.
    pub fn clear(&self) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = Tokens::default();
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.cache.clear();
        self.with_tree_view(TreeViewState::reset);
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.read().unwrap_or_else(|e| e.into_inner()).access.is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = user;
    }

    pub async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_lock.lock().await
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn roster_pending(&self) -> &RosterPending {
        &self.roster_pending
    }

    pub fn with_tree_view<R>(&self, f: impl FnOnce(&mut TreeViewState) -> R) -> R {
        let mut state = self.tree_view.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    fn snapshot(&self) -> Option<StoredSession> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner()).clone();
        Some(StoredSession {
            id: self.id,
            created_at: self.created_at,
            access_token: tokens.access?,
            refresh_token: tokens.refresh,
            user: self.user(),
        })
    }
}

// Formato do arquivo em SESSION_STORE_PATH
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    id: Uuid,
    // Arquivos antigos não têm o campo: contam a partir da carga
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    access_token: String,
    refresh_token: Option<String>,
    user: Option<User>,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<tokio::sync::RwLock<HashMap<Uuid, Arc<Session>>>>,
    path: Option<PathBuf>,
    stale_after: Duration,
}

impl SessionStore {
    pub fn in_memory(stale_after: Duration) -> Self {
        Self { sessions: Arc::default(), path: None, stale_after }
    }

    /// Recarrega as sessões gravadas. Arquivo ausente = nenhuma sessão.
    pub async fn hydrate(path: Option<PathBuf>, stale_after: Duration) -> Result<Self, AppError> {
        let mut sessions = HashMap::new();

        if let Some(path) = &path {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    let stored: Vec<StoredSession> = serde_json::from_slice(&bytes)?;
                    for entry in stored {
                        let session = Session::created(entry.id, stale_after, entry.created_at);
                        session.set_tokens(TokenPair {
                            access_token: entry.access_token,
                            refresh_token: entry.refresh_token,
                        });
                        session.set_user(entry.user);
                        sessions.insert(entry.id, Arc::new(session));
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!("Nenhuma sessão gravada em {}", path.display());
                }
                Err(e) => return Err(anyhow::Error::from(e).into()),
            }
        }

        Ok(Self { sessions: Arc::new(tokio::sync::RwLock::new(sessions)), path, stale_after })
    }

    /// Grava as sessões autenticadas. Sem caminho configurado, não faz nada.
    pub async fn persist(&self) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let stored: Vec<StoredSession> =
            self.sessions.read().await.values().filter_map(|s| s.snapshot()).collect();
        let bytes = serde_json::to_vec_pretty(&stored)?;
        tokio::fs::write(path, bytes).await.map_err(anyhow::Error::from)?;

        tracing::debug!("{} sessão(ões) gravada(s) em {}", stored.len(), path.display());
        Ok(())
    }

    /// Igual a `persist`, mas só registra a falha.
    pub async fn persist_or_warn(&self) {
        if let Err(e) = self.persist().await {
            tracing::warn!("⚠️ Não foi possível gravar as sessões: {}", e);
        }
    }

    pub async fn create(&self, tokens: TokenPair) -> Arc<Session> {
        let session = Arc::new(Session::new(Uuid::new_v4(), self.stale_after));
        session.set_tokens(tokens);
        self.sessions.write().await.insert(session.id(), session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove as sessões sem tokens e as mais velhas que `ttl` (o cookie
    /// delas já expirou). Devolve quantas saíram.
    pub async fn evict_expired(&self, ttl: chrono::Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let removed = {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|_, session| {
                let keep = session.is_authenticated() && session.created_at() > cutoff;
                if !keep {
                    // Quebra o ciclo cache -> ApiClient -> sessão
                    session.clear();
                }
                keep
            });
            before - sessions.len()
        };

        if removed > 0 {
            tracing::info!("🧹 {} sessão(ões) expirada(s) removida(s)", removed);
            self.persist_or_warn().await;
        }
        removed
    }

    /// Varredura periódica de `evict_expired`.
    pub fn spawn_eviction(&self, ttl: chrono::Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                store.evict_expired(ttl).await;
            }
        })
    }
}
