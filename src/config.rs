use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "rxscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Header carrying the client API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,rxscan_lib=debug"
}

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn default_db_path() -> PathBuf {
    app_data_dir().join("prescriptions.db")
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Where extracted records are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite { path: PathBuf },
    Supabase { url: String, key: String, timeout_secs: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub command: PathBuf,
    pub lang: String,
    pub psm: Option<u8>,
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("tesseract"),
            lang: "eng".to_string(),
            psm: None,
            tessdata_dir: None,
        }
    }
}

/// Process-wide configuration, built once at startup and handed to each
/// collaborator when it is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// `None` means the API was started without a key: protected routes fail.
    pub api_key: Option<String>,
    pub store: StoreConfig,
    pub ocr: OcrConfig,
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            api_key: None,
            store: StoreConfig::Sqlite {
                path: default_db_path(),
            },
            ocr: OcrConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host_name = if var("RXSCAN_HOST").is_some() { "RXSCAN_HOST" } else { "HOST" };
        let host = match var(host_name) {
            Some(h) => h.parse::<IpAddr>().map_err(|_| ConfigError::InvalidValue {
                name: host_name,
                value: h,
            })?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port_name = if var("RXSCAN_PORT").is_some() { "RXSCAN_PORT" } else { "PORT" };
        let port = parse_or(var(port_name), port_name, DEFAULT_PORT)?;

        let store = match (var("SUPABASE_URL"), var("SUPABASE_KEY")) {
            (Some(url), Some(key)) => StoreConfig::Supabase {
                url,
                key,
                timeout_secs: parse_or(
                    var("RXSCAN_REMOTE_TIMEOUT_SECS"),
                    "RXSCAN_REMOTE_TIMEOUT_SECS",
                    DEFAULT_REMOTE_TIMEOUT_SECS,
                )?,
            },
            _ => StoreConfig::Sqlite {
                path: var("RXSCAN_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_db_path),
            },
        };

        let ocr = OcrConfig {
            command: var("TESSERACT_CMD")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("tesseract")),
            lang: var("RXSCAN_OCR_LANG").unwrap_or_else(|| "eng".to_string()),
            psm: match var("RXSCAN_OCR_PSM") {
                Some(v) => Some(v.parse::<u8>().ok().filter(|p| *p <= 13).ok_or(
                    ConfigError::InvalidValue {
                        name: "RXSCAN_OCR_PSM",
                        value: v,
                    },
                )?),
                None => None,
            },
            tessdata_dir: var("TESSDATA_PREFIX").map(PathBuf::from),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            api_key: var("API_KEY"),
            store,
            ocr,
            max_upload_bytes: parse_or(
                var("RXSCAN_MAX_UPLOAD_BYTES"),
                "RXSCAN_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { name, value: v }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.api_key, None);
        assert!(matches!(config.store, StoreConfig::Sqlite { .. }));
        assert_eq!(config.ocr, OcrConfig::default());
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn legacy_host_and_port_are_accepted() {
        let config = config_from(&[("HOST", "0.0.0.0"), ("PORT", "9090")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9090".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn prefixed_port_wins_over_legacy() {
        let config = config_from(&[("PORT", "9090"), ("RXSCAN_PORT", "7000")]).unwrap();
        assert_eq!(config.bind_addr.port(), 7000);
    }

    #[test]
    fn supabase_selected_when_url_and_key_set() {
        let config = config_from(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", "service-key"),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreConfig::Supabase {
                url: "https://abc.supabase.co".into(),
                key: "service-key".into(),
                timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
            }
        );
    }

    #[test]
    fn supabase_url_alone_falls_back_to_sqlite() {
        let config = config_from(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("RXSCAN_DB_PATH", "/tmp/rx.db"),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreConfig::Sqlite {
                path: PathBuf::from("/tmp/rx.db")
            }
        );
    }

    #[test]
    fn blank_api_key_is_treated_as_unset() {
        let config = config_from(&[("API_KEY", "   ")]).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn ocr_settings_are_read() {
        let config = config_from(&[
            ("TESSERACT_CMD", "/usr/local/bin/tesseract"),
            ("RXSCAN_OCR_LANG", "eng+hin"),
            ("RXSCAN_OCR_PSM", "6"),
            ("TESSDATA_PREFIX", "/opt/tessdata"),
        ])
        .unwrap();
        assert_eq!(config.ocr.command, PathBuf::from("/usr/local/bin/tesseract"));
        assert_eq!(config.ocr.lang, "eng+hin");
        assert_eq!(config.ocr.psm, Some(6));
        assert_eq!(config.ocr.tessdata_dir, Some(PathBuf::from("/opt/tessdata")));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert_eq!(
            config_from(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::InvalidValue {
                name: "PORT",
                value: "eighty".into()
            }
        );
        assert!(config_from(&[("RXSCAN_OCR_PSM", "42")]).is_err());
        assert!(config_from(&[("RXSCAN_MAX_UPLOAD_BYTES", "-1")]).is_err());
        assert!(config_from(&[("HOST", "not-an-ip")]).is_err());
    }

    #[test]
    fn app_name_is_rxscan() {
        assert_eq!(APP_NAME, "rxscan");
        assert!(default_db_path().ends_with("rxscan/prescriptions.db"));
    }
}
