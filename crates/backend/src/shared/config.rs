use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where created records go
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Built-in in-memory collections (mock REST API)
    Mock,
    /// External REST API at `base_url`
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the bearer token for the external API
    #[serde(default)]
    pub token_env: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    pub max_upload_bytes: usize,
    pub max_rows: usize,
    pub session_max_age_hours: i64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            max_rows: 5000,
            session_max_age_hours: 12,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 3000

[backend]
mode = "mock"
base_url = "http://127.0.0.1:4000/api"
timeout_secs = 30
token_env = "IMPORT_API_TOKEN"

[import]
max_upload_bytes = 10485760
max_rows = 5000
session_max_age_hours = 12
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Path from `IMPORT_CONFIG` environment variable
/// 2. Next to the executable (for production)
/// 3. Current working directory (development)
/// 4. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    for config_path in candidate_paths() {
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            return parse_config(&contents);
        }
        tracing::debug!("config.toml not found at: {}", config_path.display());
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.import.max_rows == 0 {
        anyhow::bail!("import.max_rows must be greater than zero");
    }
    Ok(config)
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(explicit) = std::env::var("IMPORT_CONFIG") {
        paths.push(PathBuf::from(explicit));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            paths.push(exe_dir.join("config.toml"));
        }
    }

    paths.push(PathBuf::from("config.toml"));
    paths
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
