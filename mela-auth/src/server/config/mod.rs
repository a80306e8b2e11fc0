use serde::Deserialize;

use crate::common::LiffSettings;

#[derive(Debug, Deserialize, Clone)]
pub struct Configuration {
    pub server: ServerConfiguration,
    pub session: SessionConfiguration,
    pub backend: BackendConfiguration,

    #[serde(default)]
    pub liff: LiffSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfiguration {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfiguration {
    pub secret: String,

    #[serde(default = "default_session_max_age")]
    pub max_age_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfiguration {
    pub base_url: String,

    /// Verify LIFF access tokens against the backend before minting a
    /// session. Off by default; deployments that cannot trust the mini-app
    /// client must enable it.
    #[serde(default)]
    pub verify_liff: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_max_age() -> i64 {
    30
}

impl Configuration {
    pub fn new() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(config::File::with_name("config"));
        }

        builder = builder.add_source(config::Environment::with_prefix("MELA").separator("__"));

        builder.build()?.try_deserialize()
    }
}
