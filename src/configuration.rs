use config::ConfigError;

/// One hour
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 60 * 60;
/// Sixty days
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 60 * 24 * 60 * 60;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub store: StoreSettings,
    pub jwt: JwtSettings,
    pub polka: PolkaSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/app`
    pub static_dir: String,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct StoreSettings {
    /// JSON document holding users, chirps and refresh tokens
    pub path: String,
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,  // seconds
    pub refresh_token_expiry: i64, // seconds
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[redacted]")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

/// Shared secret for the payment provider's webhook calls
#[derive(serde::Deserialize, Clone)]
pub struct PolkaSettings {
    pub api_key: String,
}

impl std::fmt::Debug for PolkaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolkaSettings")
            .field("api_key", &"[redacted]")
            .finish()
    }
}

impl Settings {
    /// Secrets have no usable default and must be supplied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret is required (set JWT_SECRET)".to_string(),
            ));
        }
        if self.polka.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "polka.api_key is required (set POLKA_KEY)".to_string(),
            ));
        }
        if self.jwt.access_token_expiry <= 0 || self.jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::Message(
                "token expiry values must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Layered configuration, later sources win:
/// defaults, `configuration.{yaml,toml,json}`, `APP_*` environment variables
/// (`__` between sections, e.g. `APP_APPLICATION__PORT`), then `JWT_SECRET`
/// and `POLKA_KEY`. A `.env` file is loaded first if present.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let _ = dotenvy::dotenv();

    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080_i64)?
        .set_default("application.static_dir", ".")?
        .set_default("store.path", "database.json")?
        .set_default("jwt.secret", "")?
        .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
        .set_default("jwt.refresh_token_expiry", DEFAULT_REFRESH_TOKEN_EXPIRY)?
        .set_default("polka.api_key", "")?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;

    if let Ok(secret) = std::env::var("JWT_SECRET") {
        settings.jwt.secret = secret;
    }
    if let Ok(key) = std::env::var("POLKA_KEY") {
        settings.polka.api_key = key;
    }

    settings.validate()?;
    Ok(settings)
}
