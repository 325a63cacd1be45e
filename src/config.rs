use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// Currency symbol used by the confirmation summary
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub challenge: ChallengeConfig,
}

fn default_currency_symbol() -> String {
    "£".to_string()
}

/// OTP challenge policy
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChallengeConfig {
    /// Wrong codes allowed before the session is exhausted
    pub max_attempts: u8,
    /// Session lifetime in seconds
    pub ttl_secs: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            ttl_secs: 120,
        }
    }
}

impl ChallengeConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "transfer-gate.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            currency_symbol: default_currency_symbol(),
            challenge: ChallengeConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }

    /// Load `config/{env}.yaml`, falling back to defaults if it is missing.
    pub fn load_or_default(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        match fs::read_to_string(&config_path) {
            Ok(content) => serde_yaml::from_str(&content).expect("Failed to parse config yaml"),
            Err(_) => Self::default(),
        }
    }
}
