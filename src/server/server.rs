//! Servidor stdio do promptcache.
//!
//! Lê mensagens de stdin e processa cada uma em sua própria task, de modo
//! que várias queries possam estar em andamento ao mesmo tempo sobre o
//! mesmo cache. As respostas são serializadas por uma única task de escrita.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::types::config::Config;
use crate::{PromptCacheError, PromptCacheResult};

use super::handler::RequestHandler;
use super::protocol::OutboundMessage;
use super::transport::{MessageReader, MessageWriter};

/// Servidor do cache.
pub struct CacheServer {
    handler: Arc<RequestHandler>,
}

impl CacheServer {
    /// Cria um novo servidor a partir da configuração.
    pub fn new(config: &Config) -> PromptCacheResult<Self> {
        Ok(Self::with_handler(Arc::new(RequestHandler::from_config(
            config,
        )?)))
    }

    /// Cria um servidor com um handler já construído.
    pub fn with_handler(handler: Arc<RequestHandler>) -> Self {
        Self { handler }
    }

    /// Handler usado pelo servidor.
    pub fn handler(&self) -> &Arc<RequestHandler> {
        &self.handler
    }

    /// Inicia o servidor sobre stdin/stdout.
    ///
    /// Retorna quando stdin chega ao fim e todas as requisições pendentes
    /// foram respondidas.
    pub async fn run(&self) -> PromptCacheResult<()> {
        tracing::info!("promptcache server starting...");

        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await?;

        tracing::info!("promptcache server stopped");
        Ok(())
    }

    /// Processa mensagens de `reader` e escreve respostas em `writer`.
    ///
    /// Devolve o `writer` ao final. Uma falha de I/O na leitura encerra a
    /// sessão, mas só depois que as requisições em andamento foram respondidas.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> PromptCacheResult<W>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let writer_task = tokio::spawn(async move {
            let mut writer = MessageWriter::new(writer);
            while let Some(message) = rx.recv().await {
                if let Err(e) = writer.write_message(&message).await {
                    tracing::error!(error = %e, "Falha ao escrever resposta");
                }
            }
            writer.into_inner()
        });

        let mut reader = MessageReader::new(reader);
        let mut in_flight = JoinSet::new();

        let mut failure = None;

        loop {
            let line = match reader.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::info!("Client disconnected");
                    break;
                }
                Err(e @ PromptCacheError::Protocol(_)) => {
                    tracing::warn!(error = %e, "Linha descartada");
                    let reply = OutboundMessage::error(None, e.to_string(), 0);
                    if tx.send(reply).is_err() {
                        tracing::warn!("Canal de respostas fechado");
                    }
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Falha ao ler entrada");
                    failure = Some(e);
                    break;
                }
            };

            let handler = Arc::clone(&self.handler);
            let tx = tx.clone();

            in_flight.spawn(async move {
                let response = handler.handle_line(&line).await;
                if tx.send(response).is_err() {
                    tracing::warn!("Canal de respostas fechado");
                }
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Task de requisição falhou");
            }
        }

        // Fecha o canal para a task de escrita terminar
        drop(tx);

        let writer = writer_task
            .await
            .map_err(|e| PromptCacheError::other(format!("Task de escrita falhou: {}", e)))?;

        // Respostas pendentes já foram escritas antes de propagar a falha de leitura
        match failure {
            Some(e) => Err(e),
            None => Ok(writer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default_config();
        config.upstream.delay_ms = 0;
        config
    }

    fn parse_lines(output: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_serve_answers_every_line() {
        let server = CacheServer::new(&test_config()).unwrap();
        let input = concat!(
            r#"{"id":1,"query":"relatório"}"#,
            "\n",
            r#"{"id":2}"#,
            "\n",
            "lixo\n",
        );

        let output = server.serve(input.as_bytes(), Vec::new()).await.unwrap();
        let responses = parse_lines(&output);
        assert_eq!(responses.len(), 3);

        let answer = responses.iter().find(|r| r["id"] == 1).unwrap();
        assert_eq!(answer["answer"], "Summary of document: relatório");
        assert_eq!(answer["cached"], false);

        let missing = responses.iter().find(|r| r["id"] == 2).unwrap();
        assert_eq!(missing["error"], "Query is required");

        assert_eq!(
            responses.iter().filter(|r| r.get("error").is_some()).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_read_error_flushes_in_flight_replies() {
        use tokio::io::AsyncReadExt;

        let server = CacheServer::new(&test_config()).unwrap();
        let input = tokio_test::io::Builder::new()
            .read(b"{\"id\":1,\"query\":\"a\"}\n")
            .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin fechado"))
            .build();
        let (writer, mut output) = tokio::io::duplex(64 * 1024);

        let result = server.serve(BufReader::new(input), writer).await;
        assert!(matches!(result, Err(PromptCacheError::Io(_))));
        drop(result);

        let mut written = Vec::new();
        output.read_to_end(&mut written).await.unwrap();
        let responses = parse_lines(&written);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["answer"], "Summary of document: a");
    }

    #[tokio::test]
    async fn test_serve_empty_input() {
        let server = CacheServer::new(&test_config()).unwrap();
        let output = server.serve(&b""[..], Vec::new()).await.unwrap();
        assert!(output.is_empty());
    }
}
