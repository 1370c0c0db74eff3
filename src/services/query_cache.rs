// src/services/query_cache.rs

//! Cache de leituras por chave de consulta, com janela de validade fixa.
//!
//! - dado fresco: devolvido sem ir à API;
//! - dado velho ou invalidado: devolvido na hora e recarregado em segundo plano;
//! - sem dado: buscado agora e guardado junto com a função que o recarrega.
//!
//! Escritas nunca são mescladas aqui: quem escreve chama `invalidate` e o
//! recarregamento acontece em background.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use futures::{future::BoxFuture, FutureExt};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::common::error::AppError;

pub type QueryKey = Vec<String>;

type Refetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, AppError>> + Send + Sync>;

/// `key(&["sectors", "tree"])`
pub fn key(parts: &[&str]) -> QueryKey {
    parts.iter().map(|part| part.to_string()).collect()
}

struct Entry {
    value: Value,
    fetched_at: Instant,
    invalidated: bool,
    refreshing: bool,
    // Incrementa a cada invalidação; um refetch antigo não limpa a marca
    generation: u64,
    refetch: Refetcher,
}

#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, Entry>>>,
    stale_after: Duration,
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        Self { entries: Arc::new(Mutex::new(HashMap::new())), stale_after }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        !entry.invalidated && entry.fetched_at.elapsed() < self.stale_after
    }

    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let cached = self
            .lock()
            .get(&key)
            .map(|entry| (entry.value.clone(), self.is_fresh(entry)));

        match cached {
            Some((value, true)) => Ok(serde_json::from_value(value)?),
            Some((value, false)) => {
                self.spawn_refetch(&key);
                Ok(serde_json::from_value(value)?)
            }
            None => {
                tracing::debug!("consulta {:?} sem cache, buscando na API", key);
                let fetched = fetcher().await?;
                let value = serde_json::to_value(&fetched)?;

                let fetcher = Arc::new(fetcher);
                let refetch: Refetcher = Arc::new(move || {
                    let fetcher = fetcher.clone();
                    async move {
                        let fresh = fetcher().await?;
                        Ok::<_, AppError>(serde_json::to_value(fresh)?)
                    }
                    .boxed()
                });

                self.lock().insert(
                    key,
                    Entry {
                        value,
                        fetched_at: Instant::now(),
                        invalidated: false,
                        refreshing: false,
                        generation: 0,
                        refetch,
                    },
                );
                Ok(fetched)
            }
        }
    }

    fn spawn_refetch(&self, key: &QueryKey) {
        let (refetch, generation) = {
            let mut entries = self.lock();
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            // No máximo um recarregamento por chave
            if entry.refreshing {
                return;
            }
            entry.refreshing = true;
            (entry.refetch.clone(), entry.generation)
        };

        let cache = self.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let result = refetch().await;

            let mut entries = cache.lock();
            let Some(entry) = entries.get_mut(&key) else {
                return;
            };
            entry.refreshing = false;
            match result {
                Ok(value) => {
                    entry.value = value;
                    entry.fetched_at = Instant::now();
                    if entry.generation == generation {
                        entry.invalidated = false;
                    }
                }
                Err(e) => tracing::warn!("⚠️ Falha ao recarregar a consulta {:?}: {}", key, e),
            }
        });
    }

    /// Marca como inválidas todas as chaves que começam com `prefix` e
    /// dispara o recarregamento delas.
    pub fn invalidate(&self, prefix: &[&str]) {
        let matching: Vec<QueryKey> = {
            let mut entries = self.lock();
            entries
                .iter_mut()
                .filter(|(key, _)| {
                    key.len() >= prefix.len() && key.iter().zip(prefix).all(|(a, b)| a == b)
                })
                .map(|(key, entry)| {
                    entry.invalidated = true;
                    entry.generation += 1;
                    key.clone()
                })
                .collect()
        };

        tracing::debug!("invalidando {} consulta(s) com prefixo {:?}", matching.len(), prefix);
        for key in &matching {
            self.spawn_refetch(key);
        }
    }

    /// O valor guardado, fresco ou não, sem disparar nada.
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.lock().get(key).map(|entry| entry.value.clone())?;
        serde_json::from_value(value).ok()
    }

    pub fn is_invalidated(&self, key: &QueryKey) -> bool {
        self.lock().get(key).is_some_and(|entry| entry.invalidated)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    async fn settle<F: Fn() -> bool>(done: F) {
        for _ in 0..100 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("o recarregamento em background não terminou");
    }

    fn counting_fetcher(
        calls: Arc<AtomicU32>,
    ) -> impl Fn() -> BoxFuture<'static, Result<u32, AppError>> + Send + Sync + 'static {
        move || {
            let calls = calls.clone();
            async move { Ok::<_, AppError>(calls.fetch_add(1, Ordering::SeqCst) + 1) }.boxed()
        }
    }

    #[tokio::test]
    async fn fresh_hits_do_not_refetch() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));

        let first: u32 = cache.fetch(key(&["sectors", "tree"]), counting_fetcher(calls.clone())).await.unwrap();
        let second: u32 = cache.fetch(key(&["sectors", "tree"]), counting_fetcher(calls.clone())).await.unwrap();

        assert_eq!((first, second), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_refetches_in_background_by_prefix() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let tree_calls = Arc::new(AtomicU32::new(0));
        let roster_calls = Arc::new(AtomicU32::new(0));
        let org_calls = Arc::new(AtomicU32::new(0));

        let _: u32 = cache.fetch(key(&["sectors", "tree"]), counting_fetcher(tree_calls.clone())).await.unwrap();
        let _: u32 = cache
            .fetch(key(&["sectors", "s1", "members"]), counting_fetcher(roster_calls.clone()))
            .await
            .unwrap();
        let _: u32 = cache
            .fetch(key(&["organization", "members"]), counting_fetcher(org_calls.clone()))
            .await
            .unwrap();

        cache.invalidate(&["sectors"]);
        assert!(cache.is_invalidated(&key(&["sectors", "tree"])));
        assert!(!cache.is_invalidated(&key(&["organization", "members"])));

        settle(|| !cache.is_invalidated(&key(&["sectors", "tree"]))).await;
        settle(|| !cache.is_invalidated(&key(&["sectors", "s1", "members"]))).await;

        assert_eq!(tree_calls.load(Ordering::SeqCst), 2);
        assert_eq!(roster_calls.load(Ordering::SeqCst), 2);
        assert_eq!(org_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.peek::<u32>(&key(&["sectors", "tree"])), Some(2));
    }

    #[tokio::test]
    async fn stale_reads_return_old_value_while_refetching() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = Arc::new(AtomicU32::new(0));

        let first: u32 = cache.fetch(key(&["api-tokens"]), counting_fetcher(calls.clone())).await.unwrap();
        let stale: u32 = cache.fetch(key(&["api-tokens"]), counting_fetcher(calls.clone())).await.unwrap();
        assert_eq!((first, stale), (1, 1));

        settle(|| calls.load(Ordering::SeqCst) == 2).await;
        settle(|| cache.peek::<u32>(&key(&["api-tokens"])) == Some(2)).await;
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let result: Result<u32, AppError> = cache
            .fetch(key(&["envelopes"]), || async { Err(AppError::Upstream { status: 503, message: None }) })
            .await;
        assert!(result.is_err());
        assert_eq!(cache.peek::<u32>(&key(&["envelopes"])), None);
    }
}
