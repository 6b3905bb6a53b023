//! Tipos compartilhados do promptcache.

pub mod config;
pub mod errors;
pub mod requests;
