use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let config_path = path.unwrap_or_else(|| std::path::Path::new(".legalcheck.yml"));
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory tree of source documents to ingest.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    /// Pages with fewer characters than this are dropped as extraction noise.
    #[serde(default = "default_min_page_chars")]
    pub min_page_chars: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            min_page_chars: default_min_page_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Raw hits fetched per slot; larger than the final quota so the
    /// re-ranking pass has something to work with.
    #[serde(default = "default_slot_top_k")]
    pub slot_top_k: usize,
    /// Hits kept per slot after boosting and dedup.
    #[serde(default = "default_per_slot_quota")]
    pub per_slot_quota: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            slot_top_k: default_slot_top_k(),
            per_slot_quota: default_per_slot_quota(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub backend: EmbeddingBackend,
    pub model_name: String,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            // Runtime chooses external when OPENAI_API_KEY is set, otherwise Ollama.
            backend: EmbeddingBackend::Ollama,
            model_name: "nomic-embed-text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    External,
    Ollama,
    Hashed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key. Keys never
    /// appear in the config file itself.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_primary_provider")]
    pub primary: ProviderConfig,
    #[serde(default = "default_secondary_provider")]
    pub secondary: Option<ProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_provider(),
            secondary: default_secondary_provider(),
        }
    }
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("source_docs")
}

fn default_min_page_chars() -> usize {
    50
}

fn default_slot_top_k() -> usize {
    10
}

fn default_per_slot_quota() -> usize {
    4
}

fn default_primary_provider() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
        model: "gemini-2.5-flash".to_string(),
        api_key_env: Some("GOOGLE_API_KEY".to_string()),
    }
}

fn default_secondary_provider() -> Option<ProviderConfig> {
    Some(ProviderConfig {
        base_url: "https://api.openai.com/v1".to_string(),
        model: "gpt-4o".to_string(),
        api_key_env: Some("OPENAI_API_KEY".to_string()),
    })
}
