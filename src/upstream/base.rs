//! Trait base para geradores de resposta.

use async_trait::async_trait;

use crate::types::requests::Query;
use crate::PromptCacheResult;

/// Computação cara chamada pelo cache em um miss.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Retorna o nome do gerador.
    fn name(&self) -> &str;

    /// Gera uma resposta para a query.
    async fn generate(&self, query: &Query) -> PromptCacheResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PromptCacheError;

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _query: &Query) -> PromptCacheResult<String> {
            Err(PromptCacheError::Upstream(
                self.name().to_string(),
                "indisponível".to_string(),
            ))
        }
    }

    #[test]
    fn test_generator_as_trait_object() {
        let generator: Box<dyn Generator> = Box::new(FailingGenerator);
        let query = Query::new("x").unwrap();

        let err = tokio_test::block_on(generator.generate(&query)).unwrap_err();
        assert!(err.to_string().contains("failing"));
    }
}
