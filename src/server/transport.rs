//! Transporte newline-delimited JSON.
//!
//! ## Formato de Mensagens
//!
//! - Mensagens são delimitadas por newlines (`\n`)
//! - Cada mensagem é um objeto JSON completo em uma única linha
//! - Linhas vazias são ignoradas
//! - Uma linha que não é UTF-8 válido é descartada com erro de protocolo
//!
//! ```text
//! {"id":1,"query":"Resuma o relatório"}\n
//! {"id":1,"answer":"Summary of document: Resuma o relatório","cached":false,...}\n
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{PromptCacheError, PromptCacheResult};

use super::protocol::OutboundMessage;

/// Lado de leitura do transporte.
pub struct MessageReader<R> {
    reader: R,
}

impl<R: AsyncBufRead + Unpin> MessageReader<R> {
    /// Cria um novo leitor.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Lê a próxima linha não vazia.
    ///
    /// Retorna `None` em EOF. Uma linha que não é UTF-8 válido retorna
    /// [`PromptCacheError::Protocol`]; ela já foi consumida, então a próxima
    /// chamada segue para a linha seguinte.
    pub async fn read_line(&mut self) -> PromptCacheResult<Option<String>> {
        loop {
            let mut buf = Vec::new();
            let bytes_read = self.reader.read_until(b'\n', &mut buf).await?;

            if bytes_read == 0 {
                return Ok(None);
            }

            let line = String::from_utf8(buf).map_err(|e| {
                PromptCacheError::Protocol(format!("linha não é UTF-8 válido ({})", e.utf8_error()))
            })?;

            // Remove whitespace (incluindo \n e \r\n)
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            tracing::trace!(bytes = bytes_read, "Linha recebida");
            return Ok(Some(trimmed.to_string()));
        }
    }
}

/// Lado de escrita do transporte.
pub struct MessageWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    /// Cria um novo escritor.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Escreve uma mensagem como JSON compacto seguido de `\n`.
    pub async fn write_message(&mut self, message: &OutboundMessage) -> PromptCacheResult<()> {
        // JSON compacto: sem newlines embutidos
        let mut body = serde_json::to_vec(message)?;
        body.push(b'\n');

        self.writer.write_all(&body).await?;
        // Flush garante que o cliente veja a resposta imediatamente
        self.writer.flush().await?;

        tracing::debug!(id = ?message.id, is_error = message.is_error(), "Resposta enviada");
        Ok(())
    }

    /// Devolve o escritor interno.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::protocol::ResponseBody;

    #[tokio::test]
    async fn test_read_lines_skips_blank() {
        let input = b"{\"query\":\"a\"}\n\n   \r\n{\"query\":\"b\"}\r\n" as &[u8];
        let mut reader = MessageReader::new(input);

        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some(r#"{"query":"a"}"#)
        );
        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some(r#"{"query":"b"}"#)
        );
        assert!(reader.read_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let mut reader = MessageReader::new(b"{\"query\":\"x\"}" as &[u8]);
        assert!(reader.read_line().await.unwrap().is_some());
        assert!(reader.read_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_end_stream() {
        let input = b"{\"query\":\"a\"}\n\xff\xfe\n{\"query\":\"b\"}\n" as &[u8];
        let mut reader = MessageReader::new(input);

        assert!(reader.read_line().await.unwrap().is_some());
        assert!(matches!(
            reader.read_line().await,
            Err(PromptCacheError::Protocol(_))
        ));
        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some(r#"{"query":"b"}"#)
        );
        assert!(reader.read_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let mut reader = MessageReader::new(b"" as &[u8]);
        assert!(reader.read_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_message_format() {
        let mut writer = MessageWriter::new(Vec::new());
        writer
            .write_message(&OutboundMessage::new(
                Some(1.into()),
                ResponseBody::Reset { reset: true },
            ))
            .await
            .unwrap();
        writer
            .write_message(&OutboundMessage::error(None, "Query is required", 0))
            .await
            .unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(output.ends_with('\n'));

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(first["reset"], true);
    }
}
