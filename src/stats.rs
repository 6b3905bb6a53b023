//! Estatísticas de uso e economia estimada do cache.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::types::config::CostConfig;

/// Modelo de custo usado para estimar a economia.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Tokens nominalmente evitados por acerto.
    pub avg_tokens: u64,

    /// Custo assumido por token.
    pub cost_per_token: f64,
}

impl CostModel {
    /// Cria um modelo de custo.
    pub fn new(avg_tokens: u64, cost_per_token: f64) -> Self {
        Self {
            avg_tokens,
            cost_per_token,
        }
    }

    /// Custo de `requests` chamadas ao upstream.
    pub fn cost_of(&self, requests: u64) -> f64 {
        requests as f64 * self.avg_tokens as f64 * self.cost_per_token
    }
}

impl From<&CostConfig> for CostModel {
    fn from(config: &CostConfig) -> Self {
        Self::new(config.avg_tokens, config.cost_per_token)
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::from(&CostConfig::default())
    }
}

/// Retrato das estatísticas em um instante.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Total de lookups concluídos.
    pub total_requests: u64,

    /// Número de acertos (cache hits).
    pub cache_hits: u64,

    /// Número de erros (cache misses).
    pub cache_misses: u64,

    /// Taxa de acerto (0.0 - 1.0).
    pub hit_rate: f64,

    /// Entradas residentes no cache.
    pub cache_size: usize,

    /// Tokens que não precisaram ser gerados.
    pub tokens_saved: u64,

    /// Economia estimada: `hits × avg_tokens × cost_per_token`.
    pub cost_savings: f64,

    /// `hit_rate × 100`.
    pub savings_percent: f64,
}

/// Contadores de hits/misses.
///
/// Só observa resultados; não influencia o comportamento do cache.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    total_requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl StatsRecorder {
    /// Cria um recorder zerado.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra um acerto.
    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Registra um erro.
    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Zera todos os contadores. Não limpa o cache.
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
    }

    /// Calcula o snapshot a partir dos contadores atuais.
    pub fn snapshot(&self, cache_size: usize, cost: &CostModel) -> StatsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);

        let hit_rate = if total_requests == 0 {
            0.0
        } else {
            cache_hits as f64 / total_requests as f64
        };

        StatsSnapshot {
            total_requests,
            cache_hits,
            cache_misses,
            hit_rate,
            cache_size,
            tokens_saved: cache_hits.saturating_mul(cost.avg_tokens),
            cost_savings: cost.cost_of(cache_hits),
            savings_percent: hit_rate * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_has_no_division_by_zero() {
        let stats = StatsRecorder::new();
        let snap = stats.snapshot(0, &CostModel::default());

        assert_eq!(snap.total_requests, 0);
        assert_eq!(snap.hit_rate, 0.0);
        assert_eq!(snap.savings_percent, 0.0);
        assert_eq!(snap.cost_savings, 0.0);
    }

    #[test]
    fn test_snapshot_counts_and_rates() {
        let stats = StatsRecorder::new();
        stats.record_miss();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        let cost = CostModel::new(100, 0.01);
        let snap = stats.snapshot(7, &cost);

        assert_eq!(snap.total_requests, 4);
        assert_eq!(snap.cache_hits, 2);
        assert_eq!(snap.cache_misses, 2);
        assert_eq!(snap.cache_size, 7);
        assert!((snap.hit_rate - 0.5).abs() < f64::EPSILON);
        assert!((snap.savings_percent - 50.0).abs() < 1e-9);
        assert_eq!(snap.tokens_saved, 200);
        assert!((snap.cost_savings - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_savings_equals_baseline_minus_actual() {
        let stats = StatsRecorder::new();
        for _ in 0..7 {
            stats.record_hit();
        }
        for _ in 0..3 {
            stats.record_miss();
        }

        let cost = CostModel::new(500, 0.00002);
        let snap = stats.snapshot(0, &cost);

        let baseline = cost.cost_of(snap.total_requests);
        let actual = cost.cost_of(snap.cache_misses);
        assert!((snap.cost_savings - (baseline - actual)).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let stats = StatsRecorder::new();
        stats.record_hit();
        stats.record_miss();

        stats.reset();

        assert_eq!(
            stats.snapshot(0, &CostModel::default()),
            StatsSnapshot::default()
        );
    }

    #[test]
    fn test_cost_model_from_config() {
        let config = CostConfig {
            avg_tokens: 42,
            cost_per_token: 0.5,
        };
        let cost = CostModel::from(&config);
        assert_eq!(cost.avg_tokens, 42);
        assert_eq!(cost.cost_of(2), 42.0);
    }
}
