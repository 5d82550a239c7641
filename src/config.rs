//! TOML configuration for the pipeline.
//!
//! All tunables live in one explicit struct passed into each component at
//! construction: storage roots, chunk window/overlap, retrieval k, and the
//! embedding/generation provider settings. API keys are the only values
//! read from the environment (`OPENAI_API_KEY`), by the providers
//! themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
}

/// Durable storage roots. Canonical markdown goes under `processed_root`,
/// vector index directories under `index_root`.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub processed_root: PathBuf,
    pub index_root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Window size in characters.
    #[serde(default = "default_window_chars")]
    pub window_chars: usize,
    /// Overlap between consecutive windows, in characters.
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            window_chars: default_window_chars(),
            overlap_chars: default_overlap_chars(),
        }
    }
}

fn default_window_chars() -> usize {
    400
}
fn default_overlap_chars() -> usize {
    80
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Number of nearest chunks retrieved into the prompt context.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// Provider name; currently only `openai` (any OpenAI-compatible
    /// `/embeddings` endpoint).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL of the embeddings API.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Model identifier, e.g. `text-embedding-3-small`. Must be the same
    /// model at index build time and query time.
    pub model: String,
    /// Embedding vector dimensionality.
    pub dims: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible chat completions API.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Model identifier, e.g. `gpt-4o-mini`.
    pub model: String,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_generation_timeout_secs() -> u64 {
    120
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.window_chars == 0 {
        anyhow::bail!("chunking.window_chars must be > 0");
    }
    if config.chunking.overlap_chars >= config.chunking.window_chars {
        anyhow::bail!("chunking.overlap_chars must be < chunking.window_chars");
    }
    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.embedding.dims == 0 {
        anyhow::bail!("embedding.dims must be > 0");
    }
    match config.embedding.provider.as_str() {
        "openai" => {}
        other => anyhow::bail!("Unknown embedding provider: '{}'. Must be openai.", other),
    }
    Ok(())
}
