use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATA_DIR: &str = "data";

/// Server configuration read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Directory holding one catalog file per category.
    pub data_dir: PathBuf,
    pub port: u16,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self { data_dir, port }
    }
}
