//! Studio configuration
//!
//! Loaded from TOML, then overridden from the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `STUDIO_STORE_URL` | `store.base_url` (also selects the REST backend) |
//! | `STUDIO_STORE_KEY` | `store.api_key` |
//! | `STUDIO_STORE_TOKEN` | `store.access_token` |
//! | `STUDIO_STORE_TABLE` | `store.table` |
//! | `STUDIO_STORE_SNAPSHOT` | `store.snapshot_path` |
//! | `STUDIO_IMGBB_KEY` | `hosting.imgbb_api_key` |
//! | `STUDIO_LOG` | `log_filter` |

use crate::error::ConfigError;
use crate::router::Section;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Remote asset store
    pub store: StoreConfig,
    /// Generation requester
    pub generation: GenerationConfig,
    /// Upload hosting
    pub hosting: HostingConfig,
    /// Section shown after mount
    pub default_section: Section,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl StudioConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` for malformed TOML or unknown values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` when the file cannot be read, `ConfigError::Parse`
    /// when its content is not valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("STUDIO_STORE_URL") {
            self.store.backend = StoreBackend::Rest;
            self.store.base_url = Some(url);
        }
        if let Some(key) = lookup("STUDIO_STORE_KEY") {
            self.store.api_key = Some(key);
        }
        if let Some(token) = lookup("STUDIO_STORE_TOKEN") {
            self.store.access_token = Some(token);
        }
        if let Some(table) = lookup("STUDIO_STORE_TABLE") {
            self.store.table = table;
        }
        if let Some(path) = lookup("STUDIO_STORE_SNAPSHOT") {
            self.store.snapshot_path = Some(PathBuf::from(path));
        }
        if let Some(key) = lookup("STUDIO_IMGBB_KEY") {
            self.hosting.imgbb_api_key = Some(key);
        }
        if let Some(filter) = lookup("STUDIO_LOG") {
            self.log_filter = filter;
        }
        self
    }

    /// With store configuration
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// With a fixed generation seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.generation.seed = SeedPolicy::Fixed(seed);
        self
    }

    /// With the section shown after mount
    #[inline]
    #[must_use]
    pub fn with_default_section(mut self, section: Section) -> Self {
        self.default_section = section;
        self
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Rest {
            if self.store.base_url.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::Invalid(
                    "store.base_url is required for the rest backend".to_string(),
                ));
            }
            if self.store.api_key.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::Invalid(
                    "store.api_key is required for the rest backend".to_string(),
                ));
            }
        }
        if self.store.table.is_empty() {
            return Err(ConfigError::Invalid("store.table must not be empty".to_string()));
        }
        if self.generation.width == 0 || self.generation.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "generation dimensions must be positive, got {}x{}",
                self.generation.width, self.generation.height
            )));
        }
        Ok(())
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            generation: GenerationConfig::default(),
            hosting: HostingConfig::default(),
            default_section: Section::default(),
            log_filter: "info".to_string(),
        }
    }
}

/// Which store adapter to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store
    #[default]
    Memory,
    /// PostgREST-style HTTP store
    Rest,
}

/// Remote asset store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Adapter selection
    pub backend: StoreBackend,
    /// Project URL (REST backend)
    pub base_url: Option<String>,
    /// Public API key (REST backend)
    pub api_key: Option<String>,
    /// User access token; the API key is used as bearer when absent
    pub access_token: Option<String>,
    /// Record collection name
    pub table: String,
    /// JSON file the memory backend loads from and saves to
    pub snapshot_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            base_url: None,
            api_key: None,
            access_token: None,
            table: "images".to_string(),
            snapshot_path: None,
        }
    }
}

/// How generation seeds are picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Uniform in `0..1_000_000`
    #[default]
    Random,
    /// Always the same seed
    Fixed(u32),
}

/// Upper bound (exclusive) for random seeds
pub const SEED_RANGE: u32 = 1_000_000;

impl SeedPolicy {
    /// Pick the seed for one request
    #[must_use]
    pub fn pick(&self) -> u32 {
        use rand::Rng;
        match self {
            SeedPolicy::Random => rand::rng().random_range(0..SEED_RANGE),
            SeedPolicy::Fixed(seed) => *seed,
        }
    }
}

/// Generation requester configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Prompt endpoint; the encoded prompt is appended as a path segment
    pub endpoint: String,
    /// Target width
    pub width: u32,
    /// Target height
    pub height: u32,
    /// Seed policy
    #[serde(with = "seed_policy_serde")]
    pub seed: SeedPolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://image.pollinations.ai/prompt/".to_string(),
            width: 1024,
            height: 1024,
            seed: SeedPolicy::Random,
        }
    }
}

/// Upload hosting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingConfig {
    /// ImgBB API key; uploads fall back to ephemeral references without it
    pub imgbb_api_key: Option<String>,
    /// ImgBB upload endpoint
    pub endpoint: String,
    /// Optional auto-delete delay in seconds
    pub expiration_secs: Option<u32>,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            imgbb_api_key: None,
            endpoint: "https://api.imgbb.com/1/upload".to_string(),
            expiration_secs: None,
        }
    }
}

/// `seed = "random"` or `seed = 42`
mod seed_policy_serde {
    use super::SeedPolicy;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Fixed(u32),
        Word(String),
    }

    pub(super) fn serialize<S: Serializer>(policy: &SeedPolicy, s: S) -> Result<S::Ok, S::Error> {
        match policy {
            SeedPolicy::Random => Raw::Word("random".to_string()).serialize(s),
            SeedPolicy::Fixed(seed) => Raw::Fixed(*seed).serialize(s),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SeedPolicy, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Fixed(seed) => Ok(SeedPolicy::Fixed(seed)),
            Raw::Word(word) if word.eq_ignore_ascii_case("random") => Ok(SeedPolicy::Random),
            Raw::Word(word) => Err(serde::de::Error::custom(format!(
                "seed must be \"random\" or an integer, got \"{word}\""
            ))),
        }
    }
}
