//! Client configuration.
//!
//! Read from a TOML file:
//!
//! ```toml
//! [server]
//! chat = "http://localhost:6688/api"
//! notification = "http://localhost:6687/events"
//! request_timeout_secs = 30
//!
//! [token]
//! policy = "verify"
//! algorithm = "EdDSA"
//! public_key_pem = "-----BEGIN PUBLIC KEY-----..."
//!
//! [storage]
//! path = "/var/lib/parley/mirror.redb"
//! ```
//!
//! Every table and field is optional.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use jsonwebtoken::{Algorithm, DecodingKey};
use parley_core::{TokenDecoder, TokenPolicy};
use parley_remote::Endpoints;
use serde::Deserialize;
use tracing::warn;

use crate::ConfigError;

/// File name of the durable cache inside the data directory.
const STORE_FILE: &str = "mirror.redb";

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Service endpoints.
    pub server: Endpoints,
    /// Token verification.
    pub token: TokenConfig,
    /// Durable cache location.
    pub storage: StorageConfig,
}

impl EngineConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    /// Load configuration from `path`, falling back to defaults.
    ///
    /// A missing file is normal. An unreadable or invalid file is logged.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default configuration");
                Self::default()
            },
        }
    }

    /// Default configuration file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("parley").join("config.toml")
    }
}

/// How session tokens are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Decode without verifying.
    #[default]
    Trust,
    /// Verify signature and expiry.
    Verify,
}

/// The `[token]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Trust or verify.
    pub policy: PolicyKind,
    /// JWT algorithm name (`EdDSA`, `RS256`, `ES256`, `HS256`, ...).
    pub algorithm: Option<String>,
    /// PEM public key for asymmetric algorithms.
    pub public_key_pem: Option<String>,
    /// Shared secret for HMAC algorithms.
    pub secret: Option<String>,
}

impl TokenConfig {
    /// Build the token decoder these settings describe.
    pub fn decoder(&self) -> Result<TokenDecoder, ConfigError> {
        match self.policy {
            PolicyKind::Trust => Ok(TokenDecoder::trusting()),
            PolicyKind::Verify => {
                let name = self.algorithm.as_deref().unwrap_or("EdDSA");
                let algorithm = Algorithm::from_str(name)
                    .map_err(|_| ConfigError::Token(format!("unknown algorithm {name}")))?;
                let key = self.key(algorithm)?;
                Ok(TokenDecoder::new(TokenPolicy::Verify { key, algorithm }))
            },
        }
    }

    fn key(&self, algorithm: Algorithm) -> Result<DecodingKey, ConfigError> {
        let pem = || {
            self.public_key_pem
                .as_deref()
                .map(str::as_bytes)
                .ok_or_else(|| ConfigError::Token("public_key_pem is required".to_string()))
        };
        let bad_key = |e: jsonwebtoken::errors::Error| ConfigError::Token(e.to_string());

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => self
                .secret
                .as_deref()
                .map(|s| DecodingKey::from_secret(s.as_bytes()))
                .ok_or_else(|| ConfigError::Token("secret is required".to_string())),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem()?).map_err(bad_key),
            Algorithm::ES256 | Algorithm::ES384 => {
                DecodingKey::from_ec_pem(pem()?).map_err(bad_key)
            },
            _ => DecodingKey::from_rsa_pem(pem()?).map_err(bad_key),
        }
    }
}

/// The `[storage]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Durable cache file. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Durable cache file to open.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("parley").join(STORE_FILE)
        })
    }
}
