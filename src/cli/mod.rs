//! Interface de linha de comando do promptcache.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::config::DEFAULT_CONFIG_FILE;

/// promptcache - Cache de respostas LRU + TTL para chamadas caras.
#[derive(Parser, Debug)]
#[command(name = "promptcache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Inicia o servidor (JSON por linha via stdin/stdout).
    Serve,

    /// Responde queries em sequência usando um cache novo.
    Ask {
        /// Queries a responder, na ordem.
        #[arg(required = true)]
        queries: Vec<String>,
    },

    /// Responde as queries de um arquivo (uma por linha).
    Replay {
        /// Arquivo de entrada.
        input: PathBuf,
    },

    /// Mostra a configuração efetiva.
    Config,

    /// Mostra versão.
    Version,
}
