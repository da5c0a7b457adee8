use serde::Deserialize;

/// Top-level application config. Loaded from `config/tracker.toml` when
/// present, overridden by `TRACKER__`-prefixed environment variables; every
/// field has a default so an empty environment still boots.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub battlenet: BattleNetSettings,
    #[serde(default)]
    pub collector: CollectorSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BattleNetSettings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Pre-acquired user bearer token for the profile endpoints. Roster
    /// polling is skipped when absent.
    #[serde(default)]
    pub profile_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectorSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_database_url() -> String {
    "sqlite://warcraft_economy.db".to_string()
}

fn default_region() -> String {
    "eu".to_string()
}

fn default_poll_interval() -> u64 {
    1800
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for BattleNetSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            region: default_region(),
            profile_token: None,
        }
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl BattleNetSettings {
    pub fn credentials_present(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/tracker").required(false))
        .add_source(config::Environment::with_prefix("TRACKER").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
