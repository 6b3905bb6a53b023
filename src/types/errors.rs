//! Tipos de erro do promptcache.

use thiserror::Error;

/// Tipo de resultado padrão do promptcache.
pub type PromptCacheResult<T> = Result<T, PromptCacheError>;

/// Erros possíveis no promptcache.
///
/// O núcleo do cache não falha: capacidade e TTL são invariantes internos.
/// Os erros abaixo pertencem às bordas (configuração, entrada, upstream, transporte).
#[derive(Error, Debug)]
pub enum PromptCacheError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Query is required")]
    EmptyQuery,

    #[error("Upstream '{0}' falhou: {1}")]
    Upstream(String, String),

    #[error("Mensagem inválida: {0}")]
    Protocol(String),

    #[error("{0}")]
    Other(String),
}

impl PromptCacheError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
