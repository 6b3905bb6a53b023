use clap::Parser;
use promptcache::cli::{Cli, Commands};
use promptcache::types::config::Config;
use promptcache::{PromptCacheError, PromptCacheResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> PromptCacheResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet); um arquivo inválido encerra com erro
    let config = if cli.config.exists() {
        Config::load(&cli.config)
            .map_err(|e| PromptCacheError::config(format!("{}: {}", cli.config.display(), e)))?
    } else {
        Config::default_config()
    };

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("promptcache={}", log_level)
            .parse()
            .unwrap_or_else(|_| "promptcache=info".parse().expect("fallback directive is valid")),
    );

    // Logs vão para stderr: stdout é o canal de respostas do servidor
    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            promptcache::cli::commands::init(path).await?;
        }
        Commands::Serve => {
            promptcache::cli::commands::serve(&config).await?;
        }
        Commands::Ask { queries } => {
            promptcache::cli::commands::ask(&queries, &config).await?;
        }
        Commands::Replay { input } => {
            promptcache::cli::commands::replay(&input, &config).await?;
        }
        Commands::Config => {
            promptcache::cli::commands::config_cmd(&cli.config, &config)?;
        }
        Commands::Version => {
            promptcache::cli::commands::version();
        }
    }

    Ok(())
}
