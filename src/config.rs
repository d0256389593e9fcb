use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL. Without one the in-memory store is used.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL. When set, catalog reads go through the cache.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON catalog of categories and city profiles loaded at startup
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Largest accepted `limit` for recommendation requests
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Largest accepted `limit` for evaluation samples
    #[serde(default = "default_max_evaluation_cities")]
    pub max_evaluation_cities: usize,

    /// Group capacity
    #[serde(default = "default_max_group_members")]
    pub max_group_members: usize,

    /// TTL of cached catalog entries, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_recommendations() -> usize {
    30
}

fn default_max_evaluation_cities() -> usize {
    10
}

fn default_max_group_members() -> usize {
    10
}

fn default_cache_ttl_secs() -> u64 {
    86_400
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_recommendations: self.max_recommendations,
            max_evaluation_cities: self.max_evaluation_cities,
            max_group_members: self.max_group_members,
        }
    }
}

/// Request bounds enforced by the HTTP layer and services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_recommendations: usize,
    pub max_evaluation_cities: usize,
    pub max_group_members: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_recommendations: default_max_recommendations(),
            max_evaluation_cities: default_max_evaluation_cities(),
            max_group_members: default_max_group_members(),
        }
    }
}
