use crate::error::ConfigError;

const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 24 * 60 * 60;
const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 30 * 24 * 60 * 60;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub storage: StorageBackend,
}

/// Where credentials and products live
#[derive(serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT signing settings, read once at startup and shared read-only
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64, // seconds
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64, // seconds
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt token expiries must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(serde::Deserialize, Clone)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Deployment environment, picked from `APP_ENVIRONMENT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(ConfigError::InvalidValue(format!(
                "{} is not a supported environment, use `local`, `dev` or `prod`",
                other
            ))),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_access_token_expiry() -> i64 {
    DEFAULT_ACCESS_TOKEN_EXPIRY
}

fn default_refresh_token_expiry() -> i64 {
    DEFAULT_REFRESH_TOKEN_EXPIRY
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Layered load: `configuration.yaml`, then `configuration.<env>.yaml`,
/// then `APP_<SECTION>__<KEY>` environment variables.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(|e: ConfigError| config::ConfigError::Message(e.to_string()))?;

    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::File::with_name(&format!("configuration.{}", environment.as_str()))
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings
        .jwt
        .validate()
        .map_err(|e| config::ConfigError::Message(e.to_string()))?;
    Ok(settings)
}
