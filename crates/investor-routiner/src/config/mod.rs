use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub sources: SourceConfig,
    pub generation: GenerationConfig,
    pub store: Option<StoreConfig>,
    pub outputs: OutputConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let naver_base_url = env::var("NAVER_FINANCE_BASE_URL")
            .unwrap_or_else(|_| "https://finance.naver.com".to_string());
        let export_dir = export_dir(non_empty_var("CRAWL_EXPORT_DIR"));

        let perplexity_base_url = env::var("PERPLEXITY_BASE_URL")
            .unwrap_or_else(|_| "https://api.perplexity.ai".to_string());
        let default_model =
            non_empty_var("PERPLEXITY_MODEL").unwrap_or_else(|| "sonar-pro".to_string());

        let store_url =
            non_empty_var("SUPABASE_URL").or_else(|| non_empty_var("NEXT_PUBLIC_SUPABASE_URL"));
        let store_key = non_empty_var("SUPABASE_SERVICE_ROLE_KEY");
        let store = match (store_url, store_key) {
            (Some(url), Some(service_role_key)) => Some(StoreConfig {
                url,
                service_role_key,
            }),
            _ => None,
        };

        let server_save_enabled = env::var("ENABLE_SERVER_SAVE")
            .map(|value| parse_flag(&value))
            .unwrap_or(true);
        let outputs_dir = non_empty_var("OUTPUTS_DIR").unwrap_or_else(|| "outputs".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            sources: SourceConfig {
                naver_base_url,
                export_dir,
            },
            generation: GenerationConfig {
                base_url: perplexity_base_url,
                default_model,
            },
            store,
            outputs: OutputConfig {
                dir: PathBuf::from(outputs_dir),
                server_save_enabled,
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `off`, `false`, `no` or `0` disable the CSV copy; unset falls back to `temp`.
fn export_dir(value: Option<String>) -> Option<PathBuf> {
    match value {
        None => Some(PathBuf::from("temp")),
        Some(value) if is_disabled(&value) => None,
        Some(value) => Some(PathBuf::from(value)),
    }
}

fn is_disabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where financial tables are scraped from, and where raw copies are kept.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub naver_base_url: String,
    pub export_dir: Option<PathBuf>,
}

/// Report generation endpoint and the model used when a request names none.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub base_url: String,
    pub default_model: String,
}

/// Report persistence credentials. Absent when either value is unset.
#[derive(Clone)]
pub struct StoreConfig {
    pub url: String,
    pub service_role_key: String,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("service_role_key", &"<redacted>")
            .finish()
    }
}

/// Server-side markdown archive.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub server_save_enabled: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
