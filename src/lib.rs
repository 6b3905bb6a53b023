//! # promptcache
//!
//! Cache de respostas na frente de uma chamada generativa cara.
//!
//! Recebe uma query, devolve uma resposta já calculada quando disponível e,
//! caso contrário, calcula (aqui, simula), armazena e devolve uma nova.
//!
//! ## Módulos
//!
//! - [`cache`] - Derivação de chaves, store LRU + TTL e o motor do cache
//! - [`stats`] - Contadores de hits/misses e economia estimada
//! - [`upstream`] - Gerador de respostas (simulado)
//! - [`server`] - Servidor JSON por linha sobre stdio
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Tipos compartilhados

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod server;
pub mod stats;
pub mod types;
pub mod upstream;

pub use cache::{derive_key, Lookup, ResponseCache};
pub use stats::{CostModel, StatsSnapshot};
pub use types::config::Config;
pub use types::errors::{PromptCacheError, PromptCacheResult};
pub use types::requests::Query;
