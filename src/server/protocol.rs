//! Mensagens do protocolo stdio.
//!
//! Cada mensagem é um objeto JSON em uma única linha. Requisições
//! carregam uma `query` ou um `command` administrativo; o `id`, se
//! presente, é devolvido na resposta para correlação.

use serde::{Deserialize, Serialize};

use crate::stats::StatsSnapshot;
use crate::{PromptCacheError, PromptCacheResult};

/// ID de uma mensagem (pode ser número ou string).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageId {
    Number(i64),
    String(String),
}

impl From<i64> for MessageId {
    fn from(n: i64) -> Self {
        MessageId::Number(n)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId::String(s.to_string())
    }
}

/// Comandos administrativos.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminCommand {
    /// Retorna o snapshot das estatísticas.
    Stats,
    /// Limpa o cache e zera as estatísticas.
    Reset,
    /// Remove entradas expiradas.
    Sweep,
}

/// Mensagem recebida do cliente.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundMessage {
    /// ID opcional, ecoado na resposta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,

    /// Query a responder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Comando administrativo (tem precedência sobre `query`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<AdminCommand>,
}

impl InboundMessage {
    /// Cria uma mensagem de query.
    pub fn query(id: Option<MessageId>, query: impl Into<String>) -> Self {
        Self {
            id,
            query: Some(query.into()),
            command: None,
        }
    }

    /// Cria uma mensagem de comando.
    pub fn command(id: Option<MessageId>, command: AdminCommand) -> Self {
        Self {
            id,
            query: None,
            command: Some(command),
        }
    }

    /// Parseia uma linha JSON.
    pub fn parse(line: &str) -> PromptCacheResult<Self> {
        serde_json::from_str(line).map_err(|e| PromptCacheError::Protocol(e.to_string()))
    }
}

/// Tipo de correspondência usado para o acerto.
///
/// Só existe correspondência exata; o campo é informativo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
}

/// Resposta a uma query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerPayload {
    /// Resposta.
    pub answer: String,

    /// Se veio do cache.
    pub cached: bool,

    /// Latência de ponta a ponta em milissegundos.
    pub latency_ms: u64,

    /// Chave de cache.
    pub cache_key: String,

    /// Tipo de correspondência.
    pub match_type: MatchType,
}

/// Resposta de erro.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorPayload {
    /// Mensagem de erro.
    pub error: String,

    /// Sempre `false`.
    pub cached: bool,

    /// Latência em milissegundos.
    pub latency_ms: u64,
}

/// Corpo da resposta.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ResponseBody {
    Answer(AnswerPayload),
    Stats(StatsSnapshot),
    Reset { reset: bool },
    Sweep { removed: usize },
    Error(ErrorPayload),
}

/// Mensagem enviada ao cliente.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutboundMessage {
    /// ID da mensagem original.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,

    /// Conteúdo.
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl OutboundMessage {
    /// Cria uma resposta.
    pub fn new(id: Option<MessageId>, body: ResponseBody) -> Self {
        Self { id, body }
    }

    /// Cria uma resposta de erro.
    pub fn error(id: Option<MessageId>, error: impl Into<String>, latency_ms: u64) -> Self {
        Self::new(
            id,
            ResponseBody::Error(ErrorPayload {
                error: error.into(),
                cached: false,
                latency_ms,
            }),
        )
    }

    /// Verifica se é uma resposta de erro.
    pub fn is_error(&self) -> bool {
        matches!(self.body, ResponseBody::Error(_))
    }
}
