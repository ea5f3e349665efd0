use std::path::PathBuf;

/// Runtime configuration, read from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    /// `BACKEND_ADDR`, default `127.0.0.1:8080`.
    pub addr: String,
    /// `API_KEY` expected in the `X-API-KEY` header of protected routes.
    pub api_key: String,
    /// `DATA_DIR`: SQLite database and Groth16 keys live here.
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            addr: std::env::var("BACKEND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            // In production, this should be a strong secret.
            api_key: std::env::var("API_KEY").unwrap_or_else(|_| "dev-secret-key".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
        }
    }

    pub fn db_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.data_dir.join("psi.sqlite").to_string_lossy())
    }
}
