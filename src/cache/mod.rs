//! Cache de respostas LRU + TTL.
//!
//! Este módulo implementa o núcleo do promptcache: derivação de chaves,
//! armazenamento LRU com expiração por idade e o motor que decide entre
//! servir do cache ou calcular uma nova resposta.

mod clock;
mod engine;
mod key;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Lookup, ResponseCache};
pub use key::{derive_key, normalize_query};
pub use store::{CacheEntry, CacheStore};
