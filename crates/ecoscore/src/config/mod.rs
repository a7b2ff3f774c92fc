use crate::advisory::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};
use crate::scoring::{ProfileError, ScoringProfile};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ADVISORY_TIMEOUT_MS: u64 = 5_000;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub advisory: AdvisoryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let enabled = match env::var("ADVISORY_ENABLED") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "ADVISORY_ENABLED",
            })?,
            Err(_) => true,
        };
        let timeout_ms = env::var("ADVISORY_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_ADVISORY_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;
        let model =
            env::var("ADVISORY_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let endpoint =
            env::var("ADVISORY_ENDPOINT").unwrap_or_else(|_| DEFAULT_GEMINI_ENDPOINT.to_string());

        let profile_path = env::var("SCORING_PROFILE_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            advisory: AdvisoryConfig {
                enabled,
                api_key,
                model,
                endpoint,
                timeout: Duration::from_millis(timeout_ms),
            },
            scoring: ScoringConfig { profile_path },
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// External suggestion provider settings. Without an API key the provider stays off.
#[derive(Clone)]
pub struct AdvisoryConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_ADVISORY_TIMEOUT_MS),
        }
    }
}

impl fmt::Debug for AdvisoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisoryConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    pub profile_path: Option<PathBuf>,
}

impl ScoringConfig {
    pub fn profile(&self) -> Result<ScoringProfile, ConfigError> {
        match &self.profile_path {
            Some(path) => ScoringProfile::from_path(path).map_err(ConfigError::Profile),
            None => Ok(ScoringProfile::default()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    InvalidFlag { name: &'static str },
    Profile(ProfileError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "ADVISORY_TIMEOUT_MS must be a whole number of milliseconds")
            }
            ConfigError::InvalidFlag { name } => write!(f, "{name} must be true or false"),
            ConfigError::Profile(err) => write!(f, "SCORING_PROFILE_PATH: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidFlag { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Profile(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "GEMINI_API_KEY",
            "ADVISORY_ENABLED",
            "ADVISORY_TIMEOUT_MS",
            "ADVISORY_MODEL",
            "ADVISORY_ENDPOINT",
            "SCORING_PROFILE_PATH",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.advisory.enabled);
        assert_eq!(config.advisory.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.advisory.timeout, Duration::from_millis(5_000));
        assert!(config.scoring.profile_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn advisory_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GEMINI_API_KEY", "secret-key");
        env::set_var("ADVISORY_ENABLED", "off");
        env::set_var("ADVISORY_TIMEOUT_MS", "750");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.advisory.api_key.as_deref(), Some("secret-key"));
        assert!(!config.advisory.enabled);
        assert_eq!(config.advisory.timeout, Duration::from_millis(750));
        assert!(!format!("{:?}", config.advisory).contains("secret-key"));
    }

    #[test]
    fn rejects_bad_advisory_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADVISORY_TIMEOUT_MS", "soon");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidTimeout)));

        reset_env();
        env::set_var("ADVISORY_ENABLED", "maybe");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFlag {
                name: "ADVISORY_ENABLED"
            })
        ));
    }

    #[test]
    fn missing_profile_file_is_reported() {
        let scoring = ScoringConfig {
            profile_path: Some(PathBuf::from("/nonexistent/ecoscore-profile.json")),
        };
        assert!(matches!(scoring.profile(), Err(ConfigError::Profile(_))));
        assert_eq!(
            ScoringConfig::default().profile().expect("defaults"),
            ScoringProfile::default()
        );
    }

    #[test]
    fn inconsistent_profile_file_is_rejected() {
        let path = env::temp_dir().join(format!("ecoscore-profile-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "rating_ladder": { "A": 10, "B": 60 } }"#)
            .expect("write profile");
        let scoring = ScoringConfig {
            profile_path: Some(path.clone()),
        };
        let result = scoring.profile();
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(ConfigError::Profile(ProfileError::Invalid(_)))
        ));
    }
}
