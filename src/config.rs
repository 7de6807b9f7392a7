use std::{net::SocketAddr, path::PathBuf};

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Display name used by the root endpoint
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Prefix under which the item endpoints are mounted
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Directory holding the catalog JSON files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory served under `/images`
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// Number of related products attached to a detail response
    #[serde(default = "default_related_items_limit")]
    pub related_items_limit: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_app_name() -> String {
    "Catalog API".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("public/images")
}

fn default_related_items_limit() -> usize {
    crate::services::recommender::DEFAULT_TOP_N
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            api_prefix: default_api_prefix(),
            data_dir: default_data_dir(),
            images_dir: default_images_dir(),
            related_items_limit: default_related_items_limit(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the router cannot be built with
    pub fn validate(&self) -> anyhow::Result<()> {
        let prefix = self.api_prefix.as_str();
        if prefix.len() < 2 || !prefix.starts_with('/') || prefix.ends_with('/') {
            anyhow::bail!(
                "Invalid API_PREFIX '{}': must start with '/', not end with '/' and not be the root",
                prefix
            );
        }
        Ok(())
    }

    /// Address the server binds to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}
