use anyhow::{ensure, Context};
use sbcmon_exporter::client::Credentials;
use sbcmon_exporter::ExporterConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable that overrides `api_password` from the file.
pub const PASSWORD_ENV: &str = "SBCMON_API_PASSWORD";

pub const DEFAULT_CONFIG_PATH: &str = "config/sbcmon.toml";

#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
    /// Candidate element endpoints, in priority order.
    #[serde(default = "default_api_urls")]
    pub api_urls: Vec<String>,
    #[serde(default)]
    pub api_user: String,
    #[serde(default)]
    pub api_password: String,
    /// Address contexts whose zones and interface groups are discovered.
    #[serde(default = "default_address_contexts")]
    pub address_contexts: Vec<String>,
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,
    /// The element usually presents a self-signed certificate.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            metrics_path: default_metrics_path(),
            api_urls: default_api_urls(),
            api_user: String::new(),
            api_password: String::new(),
            address_contexts: default_address_contexts(),
            api_timeout_secs: default_api_timeout_secs(),
            accept_invalid_certs: default_accept_invalid_certs(),
            log_level: default_log_level(),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("listen_port", &self.listen_port)
            .field("metrics_path", &self.metrics_path)
            .field("api_urls", &self.api_urls)
            .field("api_user", &self.api_user)
            .field("api_password", &self.redacted_password())
            .field("address_contexts", &self.address_contexts)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn default_listen_port() -> u16 {
    9172
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_api_urls() -> Vec<String> {
    vec!["https://172.16.7.2/api".to_string()]
}

fn default_address_contexts() -> Vec<String> {
    vec!["default".to_string()]
}

fn default_api_timeout_secs() -> u64 {
    10
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Reads, normalizes and validates the TOML file at `path`. The password
    /// from [`PASSWORD_ENV`] wins over the file when set.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{path}'"))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config file '{path}'"))?;
        config.override_password(std::env::var(PASSWORD_ENV).ok());
        Ok(config)
    }

    /// Parses TOML content, then trims and validates it.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn override_password(&mut self, password: Option<String>) {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.api_password = password;
        }
    }

    fn normalize(&mut self) {
        for url in &mut self.api_urls {
            let trimmed = url.trim().trim_end_matches('/');
            *url = trimmed.to_string();
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.api_urls.iter().any(|u| !u.is_empty()),
            "api_urls must name at least one endpoint"
        );
        ensure!(
            self.api_urls.iter().all(|u| !u.is_empty()),
            "api_urls must not contain empty entries"
        );
        ensure!(
            self.metrics_path.starts_with('/'),
            "metrics_path must start with '/', got '{}'",
            self.metrics_path
        );
        ensure!(
            self.metrics_path != "/" && self.metrics_path != "/health",
            "metrics_path '{}' collides with a built-in route",
            self.metrics_path
        );
        ensure!(self.api_timeout_secs > 0, "api_timeout_secs must be positive");
        Ok(())
    }

    pub fn redacted_password(&self) -> &'static str {
        if self.api_password.is_empty() {
            ""
        } else {
            "<redacted>"
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.api_user.clone(),
            password: self.api_password.clone(),
        }
    }

    pub fn exporter_config(&self) -> ExporterConfig {
        ExporterConfig {
            candidates: self.api_urls.clone(),
            partitions: self.address_contexts.clone(),
        }
    }
}
