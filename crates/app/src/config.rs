//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (generation only)
//! - `GEMINI_API_KEY` - Google Gemini API key (falls back to `API_KEY`)
//!
//! ## Optional
//! - `GEMINI_TEXT_MODEL` - Fortune text model (default: gemini-2.5-flash)
//! - `GEMINI_IMAGE_MODEL` - Figurine image model (default: gemini-2.5-flash-image)
//! - `GEMINI_BASE_URL` - API base URL (default: Google's v1beta endpoint)
//! - `PAW_FORTUNE_DATA_DIR` - Local store directory (default: .paw-fortune)
//! - `PAW_FORTUNE_STORE_QUOTA_BYTES` - Store size ceiling (default: 5 MiB)
//! - `PAW_FORTUNE_SHAKE_MS` - Box shake delay in milliseconds (default: 1500)
//! - `PAW_FORTUNE_FONT` - TrueType/OpenType font used for card text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_DATA_DIR: &str = ".paw-fortune";
const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_SHAKE_MS: u64 = 1500;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Local store configuration
    pub store: StoreConfig,
    /// Gemini API configuration
    pub gemini: GeminiConfig,
    /// How long the box shakes before generation starts
    pub shake_delay: Duration,
    /// Font used to draw card text (text is skipped without one)
    pub font_path: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

/// Local key-value store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one file per key
    pub data_dir: PathBuf,
    /// Hard ceiling on total stored bytes
    pub quota_bytes: usize,
}

/// Gemini API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Google AI Studio API key
    pub api_key: SecretString,
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Model used for fortune text
    pub text_model: String,
    /// Model used for the figurine image
    pub image_model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API key is missing or fails validation,
    /// or if a numeric or URL variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store = StoreConfig::from_env()?;
        let gemini = GeminiConfig::from_env()?;
        let shake_ms = parse_env_or_default("PAW_FORTUNE_SHAKE_MS", DEFAULT_SHAKE_MS)?;

        Ok(Self {
            store,
            gemini,
            shake_delay: Duration::from_millis(shake_ms),
            font_path: font_path_from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl StoreConfig {
    /// Load only the store settings. Commands that never call Gemini use
    /// this so they work without an API key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the quota is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let quota_bytes =
            parse_env_or_default("PAW_FORTUNE_STORE_QUOTA_BYTES", DEFAULT_QUOTA_BYTES)?;
        if quota_bytes == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PAW_FORTUNE_STORE_QUOTA_BYTES".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            data_dir: PathBuf::from(get_env_or_default("PAW_FORTUNE_DATA_DIR", DEFAULT_DATA_DIR)),
            quota_bytes,
        })
    }
}

impl GeminiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = get_optional_env("GEMINI_API_KEY")
            .or_else(|| get_optional_env("API_KEY"))
            .ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;
        validate_secret_strength(&api_key, "GEMINI_API_KEY")?;

        let base_url = parse_base_url(&get_env_or_default("GEMINI_BASE_URL", DEFAULT_BASE_URL))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url,
            text_model: get_env_or_default("GEMINI_TEXT_MODEL", DEFAULT_TEXT_MODEL),
            image_model: get_env_or_default("GEMINI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
        })
    }
}

/// Font path from `PAW_FORTUNE_FONT`, if set.
#[must_use]
pub fn font_path_from_env() -> Option<PathBuf> {
    get_optional_env("PAW_FORTUNE_FONT").map(PathBuf::from)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, adding the trailing slash `Url::join` needs.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar("GEMINI_BASE_URL".to_string(), e.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API keys are random and have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by Google AI Studio."
            ),
        ));
    }

    Ok(())
}
