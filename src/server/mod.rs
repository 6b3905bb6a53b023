//! Servidor stdio do promptcache.
//!
//! Camada fina na frente do cache: lê mensagens JSON por linha, valida a
//! query e delega ao [`ResponseCache`](crate::cache::ResponseCache).
//!
//! ## Mensagens
//!
//! - `{"id":1,"query":"..."}` - responde uma query
//! - `{"command":"stats"}` - estatísticas do cache
//! - `{"command":"reset"}` - limpa cache e estatísticas
//! - `{"command":"sweep"}` - remove entradas expiradas
//!
//! ## Exemplo de Uso
//!
//! ```ignore
//! use promptcache::server::CacheServer;
//! use promptcache::types::config::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load_or_default();
//!     let server = CacheServer::new(&config).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

mod handler;
mod protocol;
#[allow(clippy::module_inception)]
mod server;
mod transport;

pub use handler::RequestHandler;
pub use protocol::{
    AdminCommand, AnswerPayload, ErrorPayload, InboundMessage, MatchType, MessageId,
    OutboundMessage, ResponseBody,
};
pub use server::CacheServer;
pub use transport::{MessageReader, MessageWriter};
