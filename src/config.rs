use std::path::PathBuf;

use serde::Deserialize;

/// Managed backend credentials. Present only when both the URL and the
/// password are set.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub database_url: String,
    pub password: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub vision_model: String,
    pub recipe_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictConfig {
    pub endpoint: String,
    pub frames_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub backend: Option<BackendConfig>,
    pub openai: OpenAiConfig,
    pub predict: PredictConfig,
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match var("APP_PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid APP_PORT {:?}: {}", p, e))?,
            None => 8080,
        };

        let backend = match (var("DATABASE_URL"), var("DATABASE_PASSWORD")) {
            (Some(database_url), Some(password)) => Some(BackendConfig {
                database_url,
                password,
                max_connections: var("DATABASE_MAX_CONNECTIONS")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
            }),
            _ => None,
        };

        let openai = OpenAiConfig {
            api_key: var("OPENAI_API_KEY"),
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com".into()),
            vision_model: var("OPENAI_VISION_MODEL").unwrap_or_else(|| "gpt-4o".into()),
            recipe_model: var("OPENAI_RECIPE_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
        };

        let predict = PredictConfig {
            endpoint: var("PREDICT_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:8080/predict".into()),
            frames_dir: var("PREDICT_FRAMES_DIR").map(PathBuf::from),
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            backend,
            openai,
            predict,
        })
    }
}
