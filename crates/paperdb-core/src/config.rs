//! Configuration loading and path helpers.
//!
//! Figment merges `paperdb.toml` + `paperdb.<env>.toml` (selected by
//! `RUST_ENV`) + `PAPERDB_*` environment variables over the serde defaults,
//! so a bare process runs with sensible values and deployments override
//! only what they need. Nested keys use a double underscore in the
//! environment, e.g. `PAPERDB_RETRIEVAL__ALPHA=0.7`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Knobs of the hybrid retrieval orchestrator. `alpha` weights the vector
/// ranking against the keyword ranking; `rrf_k` is the RRF smoothing
/// constant; `overfetch_factor` scales `top_k` for each backend request so
/// fusion can recover results that rank lower in one modality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub alpha: f32,
    pub rrf_k: u32,
    pub overfetch_factor: usize,
    pub embed_timeout_ms: u64,
    pub index_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            rrf_k: 60,
            overfetch_factor: 2,
            embed_timeout_ms: 5_000,
            index_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl RetrievalSettings {
    pub fn embed_timeout(&self) -> Duration {
        Duration::from_millis(self.embed_timeout_ms)
    }

    pub fn index_timeout(&self) -> Duration {
        Duration::from_millis(self.index_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub namespace: String,
    pub default_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { namespace: "search".to_string(), default_ttl_secs: 3_600 }
    }
}

impl CacheSettings {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

/// Where the index backends live on disk. `lexical_dir` and `vector_dir`
/// are resolved against `data_dir` unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub data_dir: String,
    pub lexical_dir: String,
    pub vector_dir: String,
    pub vector_table: String,
    pub embedding_dim: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            lexical_dir: "indexes/tantivy".to_string(),
            vector_dir: "indexes/lancedb".to_string(),
            vector_table: "paper_chunks".to_string(),
            embedding_dim: 1024,
        }
    }
}

impl IndexSettings {
    pub fn lexical_index_dir(&self) -> PathBuf {
        resolve_with_base(&expand_path(&self.data_dir), &self.lexical_dir)
    }

    pub fn vector_index_dir(&self) -> PathBuf {
        resolve_with_base(&expand_path(&self.data_dir), &self.vector_dir)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub cache: CacheSettings,
    pub index: IndexSettings,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::from_figment(Self::base_figment(&env_name))
    }

    fn base_figment(env_name: &str) -> Figment {
        let mut figment =
            Figment::from(Serialized::defaults(Self::default())).merge(Toml::file("paperdb.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("paperdb.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("paperdb.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("paperdb.test.toml")),
            _ => {}
        }
        figment.merge(Env::prefixed("PAPERDB_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let settings: Self = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.retrieval.alpha) {
            anyhow::bail!("retrieval.alpha must be within [0, 1], got {}", self.retrieval.alpha);
        }
        if self.retrieval.rrf_k == 0 {
            anyhow::bail!("retrieval.rrf_k must be positive");
        }
        if self.retrieval.overfetch_factor == 0 {
            anyhow::bail!("retrieval.overfetch_factor must be positive");
        }
        if self.index.embedding_dim == 0 {
            anyhow::bail!("index.embedding_dim must be positive");
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. Absolute paths are returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
