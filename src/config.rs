use std::path::{Path, PathBuf};

use crate::predictor::MODEL_ARTIFACT_PATH;

/// Service configuration.
///
/// Only the listen address comes from the environment. File locations are fixed:
/// pages, static assets and the `data` directory live next to the executable,
/// and the model artifact is looked up in the working directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory containing `templates/`, `static/` and `data/`.
    pub base_dir: PathBuf,
    pub model_path: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_dir = std::env::current_exe()
            .map_err(|e| anyhow::anyhow!("cannot locate the running executable: {}", e))?
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow::anyhow!("executable has no parent directory"))?;

        let config = Self {
            host: std::env::var("HOST")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            base_dir,
            model_path: PathBuf::from(MODEL_ARTIFACT_PATH),
        };

        tracing::debug!("Base directory: {}", config.base_dir.display());
        tracing::debug!("Server address: {}", config.bind_addr());

        Ok(config)
    }

    /// Configuration rooted at an explicit directory, for tools and tests.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            model_path: base_dir.join(MODEL_ARTIFACT_PATH),
            base_dir,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.base_dir.join("templates")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.base_dir.join("static")
    }
}
