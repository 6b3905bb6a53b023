//! Derivação de chaves de cache.

use sha2::{Digest, Sha256};

/// Tamanho da chave em bytes (128 bits).
const KEY_BYTES: usize = 16;

/// Gera a chave de cache para uma query.
///
/// A chave é o prefixo de 128 bits do SHA256 da query normalizada,
/// codificado em hex (32 caracteres). Queries que diferem apenas em
/// maiúsculas/minúsculas ou whitespace nas bordas geram a mesma chave;
/// qualquer outra diferença gera chaves distintas (match exato).
pub fn derive_key(query: &str) -> String {
    let normalized = normalize_query(query);

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = hasher.finalize();

    hex::encode(&digest[..KEY_BYTES])
}

/// Normaliza a query: remove whitespace das bordas e converte para minúsculas.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}
