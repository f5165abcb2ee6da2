//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Errores al leer la configuración del entorno
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Backend de persistencia para solicitudes y rutas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBackend {
    Postgres,
    Memory,
}

impl FromStr for DataBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DataBackend::Postgres),
            "memory" | "in-memory" => Ok(DataBackend::Memory),
            _ => Err(()),
        }
    }
}

/// Configuración del servicio de correo para envío de rutas
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub data_backend: DataBackend,
    pub run_migrations: bool,
    pub seed_file: Option<PathBuf>,
    pub cors_origins: Vec<String>,
    pub maps_base_url: String,
    pub email: Option<EmailConfig>,
    pub log_level: tracing::Level,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            data_backend: DataBackend::Postgres,
            run_migrations: false,
            seed_file: None,
            cors_origins: Vec::new(),
            maps_base_url: "https://www.google.com/maps".to_string(),
            email: None,
            log_level: tracing::Level::DEBUG,
        }
    }
}

impl EnvironmentConfig {
    /// Construir la configuración a partir de las variables de entorno
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Construir la configuración con una fuente de variables arbitraria
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => defaults.port,
        };

        let data_backend = match get("DATA_BACKEND") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "DATA_BACKEND", value })?,
            None => defaults.data_backend,
        };

        let run_migrations = match get("RUN_MIGRATIONS") {
            Some(value) => parse_bool(&value)
                .ok_or(ConfigError::Invalid { name: "RUN_MIGRATIONS", value })?,
            None => defaults.run_migrations,
        };

        let log_level = match get("LOG_LEVEL") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "LOG_LEVEL", value })?,
            None => defaults.log_level,
        };

        let email = get("EMAIL_API_URL").map(|api_url| EmailConfig {
            api_url,
            api_key: get("EMAIL_API_KEY"),
            from: get("EMAIL_FROM").unwrap_or_else(|| "transport@localhost".to_string()),
        });

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or(defaults.environment),
            port,
            host: get("HOST").unwrap_or(defaults.host),
            data_backend,
            run_migrations,
            seed_file: get("TRANSPORT_SEED_FILE").map(PathBuf::from),
            cors_origins: get("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            maps_base_url: get("MAPS_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.maps_base_url),
            email,
            log_level,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
