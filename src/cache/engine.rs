//! Motor do cache de respostas.
//!
//! Combina derivação de chave, o [`CacheStore`] e o [`StatsRecorder`] em
//! uma única instância compartilhada (via `Arc`) por todos os handlers.

use std::convert::Infallible;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::stats::{CostModel, StatsRecorder, StatsSnapshot};
use crate::types::config::Config;
use crate::types::requests::Query;
use crate::PromptCacheResult;

use super::clock::{Clock, SystemClock};
use super::key::derive_key;
use super::store::CacheStore;

/// Resultado de um lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Resposta (do cache ou recém-calculada).
    pub answer: String,

    /// Se veio do cache.
    pub was_hit: bool,

    /// Chave de cache da query.
    pub key: String,
}

/// Estado protegido pelo mutex: o store e os contadores mudam juntos.
struct Inner {
    store: CacheStore,
    stats: StatsRecorder,
}

/// Cache de respostas na frente de uma computação cara.
///
/// Get, put e incrementos de estatística acontecem sob o mesmo mutex, que
/// nunca é mantido durante a computação do miss.
///
/// Misses concorrentes para a mesma chave não são agrupados: cada um calcula
/// sua resposta e o último `put` vence. O estado final tem uma única entrada.
///
/// Um miss ainda calculando durante [`ResponseCache::reset_all`] insere sua
/// entrada depois do reset, então o snapshot pode mostrar `cache_size: 1`
/// com `total_requests: 0`.
pub struct ResponseCache {
    inner: Mutex<Inner>,
    cost: CostModel,
}

impl ResponseCache {
    /// Cria um novo cache.
    pub fn new(capacity: NonZeroUsize, ttl: Duration, cost: CostModel) -> Self {
        Self::with_clock(capacity, ttl, cost, Arc::new(SystemClock))
    }

    /// Cria um novo cache com um relógio específico.
    pub fn with_clock(
        capacity: NonZeroUsize,
        ttl: Duration,
        cost: CostModel,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                store: CacheStore::with_clock(capacity, ttl, clock),
                stats: StatsRecorder::new(),
            }),
            cost,
        }
    }

    /// Cria um cache a partir da configuração.
    pub fn from_config(config: &Config) -> PromptCacheResult<Self> {
        Ok(Self::new(
            config.cache.capacity()?,
            config.cache.ttl(),
            CostModel::from(&config.cost),
        ))
    }

    /// Retorna a resposta em cache ou calcula, armazena e retorna uma nova.
    ///
    /// `compute` só é chamada em um miss.
    pub async fn lookup_or_compute<F, Fut>(&self, query: &Query, compute: F) -> Lookup
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = String>,
    {
        let result = self
            .try_lookup_or_compute(query, move || async move {
                Ok::<_, Infallible>(compute().await)
            })
            .await;

        match result {
            Ok(lookup) => lookup,
            Err(never) => match never {},
        }
    }

    /// Versão falível de [`ResponseCache::lookup_or_compute`].
    ///
    /// Se `compute` falhar (ou o future for cancelado), nada é inserido no
    /// cache; o miss continua contabilizado.
    pub async fn try_lookup_or_compute<F, Fut, E>(
        &self,
        query: &Query,
        compute: F,
    ) -> Result<Lookup, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let key = derive_key(query.as_str());

        {
            let mut inner = self.inner.lock().await;
            if let Some(answer) = inner.store.get(&key) {
                inner.stats.record_hit();
                tracing::debug!(key = %key, "Cache hit");
                return Ok(Lookup {
                    answer,
                    was_hit: true,
                    key,
                });
            }
            inner.stats.record_miss();
        }

        tracing::debug!(key = %key, "Cache miss, calculando resposta");
        let answer = compute().await?;

        self.inner
            .lock()
            .await
            .store
            .put(key.clone(), answer.clone());

        Ok(Lookup {
            answer,
            was_hit: false,
            key,
        })
    }

    /// Retorna o snapshot atual das estatísticas.
    pub async fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock().await;
        inner.stats.snapshot(inner.store.len(), &self.cost)
    }

    /// Limpa o cache e zera as estatísticas.
    pub async fn reset_all(&self) {
        let mut inner = self.inner.lock().await;
        inner.store.clear();
        inner.stats.reset();
        tracing::info!("Cache e estatísticas resetados");
    }

    /// Remove entradas expiradas e retorna quantas foram removidas.
    pub async fn sweep_expired(&self) -> usize {
        let removed = self.inner.lock().await.store.purge_expired();
        tracing::debug!(removed, "Varredura de expirados concluída");
        removed
    }

    /// Número de entradas residentes.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.store.len()
    }

    /// Retorna `true` se não há entradas.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.store.is_empty()
    }
}
