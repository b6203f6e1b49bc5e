use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Redis connection URL; external lookups are not cached when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Hugging Face inference endpoint used for AI suggestions
    #[serde(default = "default_huggingface_url")]
    pub huggingface_url: String,

    /// Optional bearer token for the Hugging Face inference API
    #[serde(default)]
    pub huggingface_api_key: Option<String>,

    /// Open Library base URL
    #[serde(default = "default_openlibrary_url")]
    pub openlibrary_url: String,

    /// Cover shown when a book has no usable cover image
    #[serde(default = "default_cover_url")]
    pub default_cover_url: String,

    /// Directory served under /static
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_url() -> String {
    "sqlite://data/library.db?mode=rwc".to_string()
}

fn default_huggingface_url() -> String {
    "https://api-inference.huggingface.co/models/HuggingFaceH4/zephyr-7b-beta".to_string()
}

fn default_openlibrary_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_cover_url() -> String {
    "/static/default_cover.jpg".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5002
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address string the server binds to
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
