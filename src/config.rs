use crate::storage::{self, StorageManager};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_ORIGIN: &str = "http://localhost:3000";
/// Quiet period after the last keystroke before an interactive suggestion runs.
const DEFAULT_SUGGEST_QUIET_MS: u64 = 500;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Origins allowed to call the API from a browser.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_suggest_quiet_ms")]
    pub suggest_quiet_ms: u64,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            allowed_origins: default_allowed_origins(),
            suggest_quiet_ms: default_suggest_quiet_ms(),
            base_path: String::new(),
        }
    }
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![DEFAULT_ORIGIN.to_string()]
}

fn default_suggest_quiet_ms() -> u64 {
    DEFAULT_SUGGEST_QUIET_MS
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        if self.suggest_quiet_ms == 0 {
            bail!("suggest_quiet_ms must be greater than 0");
        }

        if self.listen_addr.trim().is_empty() {
            bail!("listen_addr must not be empty");
        }

        Ok(())
    }

    pub fn load_with(base_path: &str) -> anyhow::Result<Self> {
        let store = storage::BackendLocal::new(base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("creating default config at {base_path}/{CONFIG_FILE}");
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str =
            String::from_utf8(store.read(CONFIG_FILE)?).context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_string();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let store = storage::BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    /// Applies `PORT` and `FRONTEND_URL` on top of the file values. Not persisted.
    pub fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            self.listen_addr = with_port(&self.listen_addr, &port);
        }

        if let Ok(origin) = std::env::var("FRONTEND_URL") {
            if !origin.is_empty() && !self.allowed_origins.contains(&origin) {
                self.allowed_origins.push(origin);
            }
        }
    }

    pub fn suggest_quiet_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.suggest_quiet_ms)
    }
}

fn with_port(addr: &str, port: &str) -> String {
    match addr.rsplit_once(':') {
        Some((host, _)) => format!("{host}:{port}"),
        None => format!("{addr}:{port}"),
    }
}

#[cfg(test)]
mod tests {
    use super::with_port;

    #[test]
    fn port_override_keeps_host() {
        assert_eq!(with_port("0.0.0.0:3001", "8080"), "0.0.0.0:8080");
        assert_eq!(with_port("localhost", "8080"), "localhost:8080");
    }
}
