//! Fonte de tempo do cache.
//!
//! O TTL é calculado contra um [`Clock`] injetado, para que a expiração
//! possa ser testada sem timers reais.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Fonte de "agora" para o cache.
pub trait Clock: Send + Sync {
    /// Retorna o instante atual.
    fn now(&self) -> DateTime<Utc>;
}

/// Relógio do sistema.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Relógio controlado manualmente, para testes.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Cria um relógio parado no instante atual do sistema.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Cria um relógio parado em `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Avança o relógio.
    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
