//! Gerador simulado: atraso fixo e resposta derivada da query.

use async_trait::async_trait;
use std::time::Duration;

use super::base::Generator;
use crate::types::config::UpstreamConfig;
use crate::types::requests::Query;
use crate::PromptCacheResult;

/// Gerador que simula um modelo lento.
pub struct SimulatedGenerator {
    delay: Duration,
    answer_prefix: String,
}

impl SimulatedGenerator {
    /// Cria um novo gerador simulado.
    pub fn new(delay: Duration, answer_prefix: impl Into<String>) -> Self {
        Self {
            delay,
            answer_prefix: answer_prefix.into(),
        }
    }

    /// Cria um gerador a partir da configuração.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(
            Duration::from_millis(config.delay_ms),
            config.answer_prefix.clone(),
        )
    }

    /// Atraso de cada chamada.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedGenerator {
    fn default() -> Self {
        Self::from_config(&UpstreamConfig::default())
    }
}

#[async_trait]
impl Generator for SimulatedGenerator {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn generate(&self, query: &Query) -> PromptCacheResult<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(format!("{}{}", self.answer_prefix, query.as_str()))
    }
}
