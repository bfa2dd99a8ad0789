//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_jwt_leeway_secs() -> u64 {
    30
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// HS256 key bearer tokens are signed with.
    pub secret: String,
    #[serde(default = "default_jwt_leeway_secs")]
    pub jwt_leeway_secs: u64,
}

#[cfg(feature = "server")]
impl ServerConfig {
    /// Reads `config/default.yaml`, then `config/{APP_ENV}.yaml` when present
    /// (`APP_ENV` defaults to `local`), then `APP_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }
}
