//! # Client Configuration
//!
//! Where the backend lives, how the token travels, and where local state is
//! kept.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PAGETURNER_API_URL=https://books.example.com/api                   │
//! │     PAGETURNER_AUTH_SCHEME=x-auth-token                                │
//! │     VITE_API_URL (fallback for the API URL)                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pageturner/client.toml (Linux)                           │
//! │     ~/Library/Application Support/com.pageturner.client/client.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:3000/api, Bearer header, role from /auth/me       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [api]
//! base_url = "http://localhost:3000/api"
//! timeout_secs = 15
//! auth_scheme = "bearer"        # bearer | x-auth-token
//! role_source = "stored_flag"   # stored_flag | token_claim
//! page_limit = 12
//!
//! [storage]
//! data_dir = "/var/lib/pageturner"
//! watch_interval_ms = 1000
//!
//! [open_library]
//! base_url = "https://openlibrary.org"
//! covers_url = "https://covers.openlibrary.org"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Auth Scheme
// =============================================================================

/// How the stored token is attached to requests.
///
/// The backend has accepted both over time; which one a deployment wants is
/// a configuration choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `x-auth-token: <token>`
    XAuthToken,
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthScheme::Bearer => write!(f, "bearer"),
            AuthScheme::XAuthToken => write!(f, "x-auth-token"),
        }
    }
}

impl std::str::FromStr for AuthScheme {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bearer" | "authorization" => Ok(AuthScheme::Bearer),
            "x-auth-token" | "xauthtoken" | "header" => Ok(AuthScheme::XAuthToken),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown auth scheme: '{}'. Valid options: bearer, x-auth-token",
                other
            ))),
        }
    }
}

// =============================================================================
// Role Source
// =============================================================================

/// Where the admin flag comes from after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSource {
    /// Ask `GET /auth/me` and store the flag next to the token.
    #[default]
    StoredFlag,
    /// Read an admin claim from the (unverified) JWT payload.
    TokenClaim,
}

impl std::fmt::Display for RoleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleSource::StoredFlag => write!(f, "stored_flag"),
            RoleSource::TokenClaim => write!(f, "token_claim"),
        }
    }
}

impl std::str::FromStr for RoleSource {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "stored_flag" | "flag" | "me" => Ok(RoleSource::StoredFlag),
            "token_claim" | "claim" | "jwt" => Ok(RoleSource::TokenClaim),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown role source: '{}'. Valid options: stored_flag, token_claim",
                other
            ))),
        }
    }
}

// =============================================================================
// API Settings
// =============================================================================

/// REST backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub auth_scheme: AuthScheme,

    #[serde(default)]
    pub role_source: RoleSource,

    /// Catalog page size.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_page_limit() -> u32 {
    pageturner_core::DEFAULT_PAGE_LIMIT
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            auth_scheme: AuthScheme::default(),
            role_source: RoleSource::default(),
            page_limit: default_page_limit(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for the file store. Platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Poll interval for noticing writes from other processes (ms).
    #[serde(default = "default_watch_interval")]
    pub watch_interval_ms: u64,
}

fn default_watch_interval() -> u64 {
    1000
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            data_dir: None,
            watch_interval_ms: default_watch_interval(),
        }
    }
}

// =============================================================================
// Open Library Settings
// =============================================================================

/// Open Library endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenLibrarySettings {
    #[serde(default = "default_open_library_url")]
    pub base_url: String,

    #[serde(default = "default_covers_url")]
    pub covers_url: String,
}

fn default_open_library_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_covers_url() -> String {
    "https://covers.openlibrary.org".to_string()
}

impl Default for OpenLibrarySettings {
    fn default() -> Self {
        OpenLibrarySettings {
            base_url: default_open_library_url(),
            covers_url: default_covers_url(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub open_library: OpenLibrarySettings,
}

impl ClientConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config pointing at a specific backend, everything else default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.base_url = base_url.into();
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = url::Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(self.api.base_url.clone()));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.api.page_limit == 0 {
            return Err(ClientError::InvalidConfig(
                "page_limit must be greater than 0".into(),
            ));
        }

        url::Url::parse(&self.open_library.base_url)?;
        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    fn apply_overrides_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("PAGETURNER_API_URL").or_else(|| var("VITE_API_URL")) {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(scheme) = var("PAGETURNER_AUTH_SCHEME") {
            match scheme.parse() {
                Ok(parsed) => self.api.auth_scheme = parsed,
                Err(_) => warn!(scheme = %scheme, "Unknown auth scheme in environment"),
            }
        }

        if let Some(source) = var("PAGETURNER_ROLE_SOURCE") {
            match source.parse() {
                Ok(parsed) => self.api.role_source = parsed,
                Err(_) => warn!(source = %source, "Unknown role source in environment"),
            }
        }

        if let Some(dir) = var("PAGETURNER_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(timeout) = var("PAGETURNER_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse::<u64>() {
                self.api.timeout_secs = t;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("client.toml"))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "pageturner", "client")
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Directory for the file store.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| Self::project_dirs().map(|d| d.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".pageturner"))
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Watcher poll interval as a Duration.
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.storage.watch_interval_ms.max(10))
    }
}
