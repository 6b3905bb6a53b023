//! Armazenamento LRU com TTL.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;

use super::clock::{Clock, SystemClock};

/// Entrada em cache.
///
/// Imutável depois de criada; só a posição de recência muda.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Chave derivada da query.
    pub key: String,

    /// Resposta armazenada.
    pub answer: String,

    /// Momento em que foi cacheada.
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Cria uma nova entrada.
    pub fn new(key: String, answer: String, created_at: DateTime<Utc>) -> Self {
        Self {
            key,
            answer,
            created_at,
        }
    }

    /// Verifica se a entrada expirou em `now`.
    ///
    /// Uma entrada com idade `>= ttl` está expirada. Idade negativa (relógio
    /// voltou no tempo) também conta como expirada.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now
            .signed_duration_since(self.created_at)
            .to_std()
            .unwrap_or(Duration::MAX);
        age >= ttl
    }
}

/// Cache LRU com expiração por idade.
///
/// A ordem de recência é mantida pelo `LruCache` (índice hash + lista
/// duplamente ligada), então get/put/move-to-front são O(1).
///
/// A expiração é preguiçosa: só `get()` ou [`CacheStore::purge_expired`]
/// removem entradas vencidas, e `len()` pode contar entradas velhas que
/// ainda não foram tocadas.
pub struct CacheStore {
    entries: LruCache<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    /// Cria um novo store com relógio do sistema.
    ///
    /// # Argumentos
    /// - `capacity`: Número máximo de entradas
    /// - `ttl`: Tempo de vida das entradas
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    /// Cria um novo store com um relógio específico.
    pub fn with_clock(capacity: NonZeroUsize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: LruCache::new(capacity),
            ttl,
            clock,
        }
    }

    /// Busca no cache.
    ///
    /// Retorna `None` se não encontrado ou se expirado. Uma entrada expirada
    /// é removida; uma entrada válida passa a ser a mais recente.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = self.clock.now();

        // peek não altera a ordem LRU
        let is_expired = self.entries.peek(key).map(|e| e.is_expired(now, self.ttl));

        match is_expired {
            Some(true) => {
                self.entries.pop(key);
                tracing::debug!(key = %key, "Entrada expirada removida");
                None
            }
            Some(false) => self.entries.get(key).map(|e| e.answer.clone()),
            None => None,
        }
    }

    /// Insere ou substitui uma entrada, marcando-a como a mais recente.
    ///
    /// Se a inserção ultrapassar a capacidade, exatamente uma entrada (a menos
    /// recente) é removida.
    pub fn put(&mut self, key: String, answer: String) {
        let entry = CacheEntry::new(key.clone(), answer, self.clock.now());

        if let Some((old_key, _)) = self.entries.push(key.clone(), entry) {
            if old_key != key {
                tracing::debug!(evicted = %old_key, "Entrada LRU removida por capacidade");
            }
        }
    }

    /// Número de entradas residentes (inclui entradas expiradas ainda não tocadas).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Retorna `true` se não há entradas.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacidade máxima.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Tempo de vida configurado.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Limpa todo o cache.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove entradas expiradas e retorna quantas foram removidas.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();

        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired(now, self.ttl))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired_keys {
            self.entries.pop(key);
        }

        expired_keys.len()
    }

    /// Chaves em ordem de recência, da mais recente para a menos recente.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn store_with_clock(capacity: usize, ttl_secs: u64) -> (CacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store =
            CacheStore::with_clock(cap(capacity), Duration::from_secs(ttl_secs), clock.clone());
        (store, clock)
    }

    #[test]
    fn test_put_then_get() {
        let (mut store, _) = store_with_clock(10, 60);

        store.put("k".to_string(), "resposta".to_string());
        assert_eq!(store.len(), 1);

        assert_eq!(store.get("k").as_deref(), Some("resposta"));
        // get não altera o tamanho
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let (mut store, _) = store_with_clock(10, 60);
        assert!(store.get("nada").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ttl_boundary() {
        let (mut store, clock) = store_with_clock(10, 60);
        store.put("k".to_string(), "v".to_string());

        clock.advance(Duration::from_secs(59));
        assert!(store.get("k").is_some());

        clock.advance(Duration::from_secs(1));
        // Idade == TTL: expirado e removido
        assert!(store.get("k").is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_zero_ttl_always_expired() {
        let (mut store, _) = store_with_clock(10, 0);
        store.put("k".to_string(), "v".to_string());
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_len_counts_stale_entries_until_touched() {
        let (mut store, clock) = store_with_clock(10, 5);
        store.put("a".to_string(), "1".to_string());
        store.put("b".to_string(), "2".to_string());

        clock.advance(Duration::from_secs(10));
        assert_eq!(store.len(), 2);

        store.get("a");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lru_eviction_order() {
        let (mut store, _) = store_with_clock(2, 60);

        store.put("a".to_string(), "1".to_string());
        store.put("b".to_string(), "2".to_string());
        assert!(store.get("a").is_some()); // a passa a ser a mais recente
        store.put("c".to_string(), "3".to_string()); // Deve evictar b

        assert_eq!(store.len(), 2);
        assert!(store.get("b").is_none());
        assert!(store.get("a").is_some());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn test_eviction_removes_exactly_one() {
        let (mut store, _) = store_with_clock(3, 60);
        for k in ["a", "b", "c", "d"] {
            store.put(k.to_string(), k.to_uppercase());
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.keys_by_recency(), vec!["d", "c", "b"]);
    }

    #[test]
    fn test_reinsert_replaces_and_refreshes() {
        let (mut store, clock) = store_with_clock(2, 60);

        store.put("a".to_string(), "velho".to_string());
        store.put("b".to_string(), "2".to_string());

        clock.advance(Duration::from_secs(50));
        store.put("a".to_string(), "novo".to_string());
        assert_eq!(store.len(), 2);
        assert_eq!(store.keys_by_recency(), vec!["a", "b"]);

        // O timestamp também foi renovado
        clock.advance(Duration::from_secs(20));
        assert_eq!(store.get("a").as_deref(), Some("novo"));
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_clear() {
        let mut store = CacheStore::new(cap(10), Duration::from_secs(60));
        store.put("a".to_string(), "1".to_string());
        store.put("b".to_string(), "2".to_string());

        store.clear();

        assert!(store.is_empty());
        assert!(store.get("a").is_none());
        assert_eq!(store.capacity(), 10);
    }

    #[test]
    fn test_purge_expired() {
        let (mut store, clock) = store_with_clock(10, 30);
        store.put("velho".to_string(), "1".to_string());

        clock.advance(Duration::from_secs(20));
        store.put("novo".to_string(), "2".to_string());

        clock.advance(Duration::from_secs(15));
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("novo").is_some());
    }

    #[test]
    fn test_cache_entry_is_expired() {
        let now = Utc::now();
        let entry = CacheEntry::new("k".to_string(), "v".to_string(), now);

        // Com TTL de 1 hora, não deve estar expirado
        assert!(!entry.is_expired(now, Duration::from_secs(3600)));

        // Com TTL de 0, deve estar expirado
        assert!(entry.is_expired(now, Duration::from_secs(0)));

        // Relógio voltou no tempo
        let before = now - chrono::Duration::seconds(1);
        assert!(entry.is_expired(before, Duration::from_secs(3600)));
    }
}
