//! Tipos de requisição do promptcache.

use serde::{Deserialize, Serialize};

use crate::types::errors::{PromptCacheError, PromptCacheResult};

/// Query validada, pronta para entrar no cache.
///
/// Nunca vazia (nem composta apenas de whitespace). O texto original é
/// preservado; a normalização acontece somente na derivação da chave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Query(String);

impl Query {
    /// Valida e cria uma nova query.
    pub fn new(raw: impl Into<String>) -> PromptCacheResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(PromptCacheError::EmptyQuery);
        }
        Ok(Self(raw))
    }

    /// Texto da query, como recebido.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Query {
    type Error = PromptCacheError;

    fn try_from(value: String) -> PromptCacheResult<Self> {
        Self::new(value)
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requisição de resposta, com ID para correlacionar logs.
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    /// ID único da requisição.
    pub request_id: String,

    /// Query a responder.
    pub query: Query,
}

impl AnswerRequest {
    /// Cria uma nova requisição.
    pub fn new(query: Query) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            query,
        }
    }
}
