use std::env;

use config::{
    Config,
    ConfigError,
    File,
};
use custom_error::custom_error;
use derivative::Derivative;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{
    PgConnectOptions,
    PgSslMode,
};
use sqlx::ConnectOptions;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub admin: AdminSettings,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub max_pending_connections: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Clone, Derivative, serde::Deserialize)]
#[derivative(Debug)]
pub struct DatabaseSettings {
    pub connect_timeout_seconds: u64,
    pub name: String,
    pub host: String,
    pub max_db_connections: u32,
    #[derivative(Debug = "ignore")]
    pub password: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub require_ssl: bool,
    pub username: String,
}

/// The administrator account created at startup when no user has its email.
#[derive(Clone, Derivative, serde::Deserialize)]
#[derivative(Debug)]
pub struct AdminSettings {
    pub email: String,
    #[derivative(Debug = "ignore")]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ApplicationSettings {
    pub fn binding_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseSettings {
    pub fn pgserver_connection_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(&self.password)
            .port(self.port)
            .ssl_mode(ssl_mode)
    }
    pub fn database_connection_options(&self) -> PgConnectOptions {
        self.pgserver_connection_options()
            .database(&self.name)
            .log_statements(log::LevelFilter::Trace)
    }
}

custom_error! {
///! Custom error for an unknown environment or invalid configuration files.
pub ConfigurationError
    UnknownEnvironment{environment:String} = "`{environment}` is not a supported \
    environment (possible values: [`local`|`production`]).",
    InvalidConfig{source:ConfigError} = "{source}",
}

/// Load the configuration from the directory: `configuration`.
///
/// `APP_ENVIRONMENT` selects the environment file and defaults to `local`.
///
/// It fails if:
/// - `APP_ENVIRONMENT` is neither `local` nor `production`
/// - the `configuration/base` file is missing
/// - the `configuration/${APP_ENVIRONMENT}` file is missing
/// - the `configuration/*` files have missing or unexpected fields
///
/// # Examples
///
/// ```rust
/// use newsletter_lists::app::load_configuration;
///
/// assert!(load_configuration().is_ok());
/// ```
pub fn load_configuration() -> Result<Settings, ConfigurationError> {
    let app_environment = env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".into());
    if !["local", "production"].contains(&app_environment.as_str()) {
        return Err(ConfigurationError::UnknownEnvironment {
            environment: app_environment,
        });
    }

    // Settings from environment variables use the `APP` prefix and `__` as
    // separator, e.g. `APP_APPLICATION__PORT=5001` sets `Settings.application.port`
    let settings = Config::builder()
        .add_source(File::with_name("configuration/base").required(true))
        .add_source(File::with_name(&format!("configuration/{}", app_environment)).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
