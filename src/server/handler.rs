//! Handler de requisições.
//!
//! Valida a query, chama o cache e monta a resposta. É o único ponto
//! que conhece tanto o cache quanto o gerador upstream.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::cache::ResponseCache;
use crate::types::config::Config;
use crate::types::requests::{AnswerRequest, Query};
use crate::upstream::{Generator, SimulatedGenerator};
use crate::PromptCacheResult;

use super::protocol::{
    AdminCommand, AnswerPayload, InboundMessage, MatchType, MessageId, OutboundMessage,
    ResponseBody,
};

/// Handler compartilhado por todas as requisições.
pub struct RequestHandler {
    cache: Arc<ResponseCache>,
    generator: Arc<dyn Generator>,
}

impl RequestHandler {
    /// Cria um novo handler.
    pub fn new(cache: Arc<ResponseCache>, generator: Arc<dyn Generator>) -> Self {
        Self { cache, generator }
    }

    /// Cria um handler a partir da configuração, com gerador simulado.
    pub fn from_config(config: &Config) -> PromptCacheResult<Self> {
        let cache = ResponseCache::from_config(config)?;
        let generator = SimulatedGenerator::from_config(&config.upstream);
        Ok(Self::new(Arc::new(cache), Arc::new(generator)))
    }

    /// Cache usado pelo handler.
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Responde uma query validada.
    pub async fn answer(&self, query: &Query) -> PromptCacheResult<AnswerPayload> {
        let started = Instant::now();
        let request = AnswerRequest::new(query.clone());
        let span = tracing::debug_span!("answer", request_id = %request.request_id);

        let lookup = self
            .cache
            .try_lookup_or_compute(&request.query, || self.generator.generate(&request.query))
            .instrument(span)
            .await?;

        let latency_ms = elapsed_ms(started);
        tracing::info!(
            request_id = %request.request_id,
            cached = lookup.was_hit,
            latency_ms,
            "Query respondida"
        );

        Ok(AnswerPayload {
            answer: lookup.answer,
            cached: lookup.was_hit,
            latency_ms,
            cache_key: lookup.key,
            match_type: MatchType::Exact,
        })
    }

    /// Processa uma linha crua do transporte.
    pub async fn handle_line(&self, line: &str) -> OutboundMessage {
        match InboundMessage::parse(line) {
            Ok(message) => self.handle(message).await,
            Err(e) => {
                tracing::warn!(error = %e, "Mensagem inválida");
                OutboundMessage::error(None, e.to_string(), 0)
            }
        }
    }

    /// Processa uma mensagem.
    pub async fn handle(&self, message: InboundMessage) -> OutboundMessage {
        let InboundMessage { id, query, command } = message;

        match command {
            Some(command) => self.handle_command(id, command).await,
            None => self.handle_query(id, query).await,
        }
    }

    async fn handle_query(&self, id: Option<MessageId>, raw: Option<String>) -> OutboundMessage {
        let started = Instant::now();

        let query = match Query::new(raw.unwrap_or_default()) {
            Ok(query) => query,
            Err(e) => return OutboundMessage::error(id, e.to_string(), elapsed_ms(started)),
        };

        match self.answer(&query).await {
            Ok(payload) => OutboundMessage::new(id, ResponseBody::Answer(payload)),
            Err(e) => {
                tracing::error!(error = %e, "Falha ao responder query");
                OutboundMessage::error(id, e.to_string(), elapsed_ms(started))
            }
        }
    }

    async fn handle_command(
        &self,
        id: Option<MessageId>,
        command: AdminCommand,
    ) -> OutboundMessage {
        tracing::debug!(?command, "Comando administrativo");

        let body = match command {
            AdminCommand::Stats => ResponseBody::Stats(self.cache.snapshot().await),
            AdminCommand::Reset => {
                self.cache.reset_all().await;
                ResponseBody::Reset { reset: true }
            }
            AdminCommand::Sweep => ResponseBody::Sweep {
                removed: self.cache.sweep_expired().await,
            },
        };

        OutboundMessage::new(id, body)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
