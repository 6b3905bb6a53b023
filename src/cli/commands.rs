//! Implementação dos comandos CLI do promptcache.

use std::path::{Path, PathBuf};

use crate::server::{CacheServer, RequestHandler};
use crate::stats::StatsSnapshot;
use crate::types::config::{Config, DEFAULT_CONFIG_FILE};
use crate::types::requests::Query;
use crate::{PromptCacheError, PromptCacheResult};

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> PromptCacheResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    // Create directory if it doesn't exist
    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(DEFAULT_CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use 'promptcache config' to inspect it.");
        return Ok(());
    }

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("promptcache initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Adjust [cache] capacity / ttl_secs in {}",
        DEFAULT_CONFIG_FILE
    );
    println!("  2. Try it: promptcache ask \"hello\" \"HELLO\"");
    println!("  3. Run the server: promptcache serve");

    Ok(())
}

/// Inicia o servidor stdio.
pub async fn serve(config: &Config) -> PromptCacheResult<()> {
    tracing::debug!(
        "Configuração carregada: capacidade={}, ttl={}s, atraso upstream={}ms",
        config.cache.capacity,
        config.cache.ttl_secs,
        config.upstream.delay_ms
    );

    let server = CacheServer::new(config)?;
    server.run().await
}

/// Responde queries passadas na linha de comando.
pub async fn ask(queries: &[String], config: &Config) -> PromptCacheResult<()> {
    run_queries(queries.iter().map(String::as_str), config).await
}

/// Responde as queries de um arquivo, uma por linha.
pub async fn replay(input: &Path, config: &Config) -> PromptCacheResult<()> {
    let content = std::fs::read_to_string(input)?;
    let queries = content.lines().filter(|l| !l.trim().is_empty());

    run_queries(queries, config).await
}

async fn run_queries<'a>(
    queries: impl Iterator<Item = &'a str>,
    config: &Config,
) -> PromptCacheResult<()> {
    let handler = RequestHandler::from_config(config)?;

    for raw in queries {
        let query = match Query::new(raw) {
            Ok(query) => query,
            Err(PromptCacheError::EmptyQuery) => {
                println!("✗ (vazia) - Query is required");
                continue;
            }
            Err(e) => return Err(e),
        };

        let payload = handler.answer(&query).await?;
        let status = if payload.cached { "HIT " } else { "MISS" };
        println!(
            "{} [{}] {}ms  {}",
            status,
            &payload.cache_key[..8],
            payload.latency_ms,
            payload.answer
        );
    }

    println!();
    print_snapshot(&handler.cache().snapshot().await);

    Ok(())
}

fn print_snapshot(snapshot: &StatsSnapshot) {
    println!("Estatísticas do cache:");
    println!("  Requisições:  {}", snapshot.total_requests);
    println!("  Hits:         {}", snapshot.cache_hits);
    println!("  Misses:       {}", snapshot.cache_misses);
    println!("  Hit rate:     {:.1}%", snapshot.savings_percent);
    println!("  Entradas:     {}", snapshot.cache_size);
    println!("  Tokens salvos: {}", snapshot.tokens_saved);
    println!("  Economia:     ${:.4}", snapshot.cost_savings);
}

/// Mostra a configuração efetiva.
pub fn config_cmd(config_path: &Path, config: &Config) -> PromptCacheResult<()> {
    if config_path.exists() {
        println!("# {}", config_path.display());
    } else {
        println!(
            "# {} não encontrado - usando padrões",
            config_path.display()
        );
    }

    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("promptcache {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Cache de respostas LRU + TTL para chamadas caras a modelos generativos");
}
