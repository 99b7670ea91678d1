//! Back-office configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Project URL of the hosted database (e.g., `https://abc.supabase.co`)
//! - `SUPABASE_KEY` - Project API key sent with every table request
//!
//! ## Optional
//! - `SUPABASE_SCHEMA` - Database schema exposed by the table API (default: public)
//! - `SUPABASE_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `LOG_FORMAT` - `json` or `text` (default: text)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_SCHEMA: &str = "public";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Back-office application configuration.
#[derive(Debug, Clone)]
pub struct BackofficeConfig {
    /// Hosted database (table API) configuration
    pub supabase: SupabaseConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Log output format
    pub log_format: LogFormat,
}

/// Hosted database configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL
    pub url: Url,
    /// Project API key
    pub api_key: SecretString,
    /// Schema exposed through the table API
    pub schema: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SupabaseConfig {
    /// Build a configuration from explicit values with default schema and timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `url` is not an absolute URL.
    pub fn new(url: &str, api_key: SecretString) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_url("SUPABASE_URL", url)?,
            api_key,
            schema: DEFAULT_SCHEMA.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    fn from_source(env: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = get_required(env, "SUPABASE_URL")?;
        let timeout_secs = get_or_default(env, "SUPABASE_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SUPABASE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SUPABASE_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            url: parse_url("SUPABASE_URL", &url)?,
            api_key: get_validated_secret(env, "SUPABASE_KEY")?,
            schema: get_or_default(env, "SUPABASE_SCHEMA", DEFAULT_SCHEMA),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl BackofficeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(&|key: &str| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`BackofficeConfig::from_env`].
    pub fn from_source(env: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let supabase = SupabaseConfig::from_source(env)?;
        let sentry_dsn = env("SENTRY_DSN").filter(|s| !s.trim().is_empty());
        let sentry_environment = env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let log_format = match get_or_default(env, "LOG_FORMAT", "text")
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected 'json' or 'text', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            supabase,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            log_format,
        })
    }

    /// Returns a reference to the hosted database configuration.
    #[must_use]
    pub const fn supabase(&self) -> &SupabaseConfig {
        &self.supabase
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn get_required(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default value.
fn get_or_default(env: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an absolute http(s) URL.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
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
    let len = s.len() as f64;
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

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key from the project settings."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret.
fn get_validated_secret(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<SecretString, ConfigError> {
    let value = get_required(env, key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const GOOD_KEY: &str = "eyJhbGciOiJIUzI1NiJ9.aB3xY9mK2nL5pQ7rT0uW4zC6";

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-anon-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(GOOD_KEY, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_from_source_defaults() {
        let env = source(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", GOOD_KEY),
        ]);
        let config = BackofficeConfig::from_source(&env).unwrap();

        assert_eq!(config.supabase.url.as_str(), "https://abc.supabase.co/");
        assert_eq!(config.supabase.schema, "public");
        assert_eq!(config.supabase.timeout, Duration::from_secs(30));
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_from_source_overrides() {
        let env = source(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", GOOD_KEY),
            ("SUPABASE_SCHEMA", "shop"),
            ("SUPABASE_TIMEOUT_SECS", "5"),
            ("LOG_FORMAT", "JSON"),
            ("SENTRY_SAMPLE_RATE", "0.25"),
        ]);
        let config = BackofficeConfig::from_source(&env).unwrap();

        assert_eq!(config.supabase.schema, "shop");
        assert_eq!(config.supabase.timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!((config.sentry_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_source_missing_url() {
        let env = source(&[("SUPABASE_KEY", GOOD_KEY)]);
        let err = BackofficeConfig::from_source(&env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SUPABASE_URL"));
    }

    #[test]
    fn test_from_source_missing_key() {
        let env = source(&[("SUPABASE_URL", "https://abc.supabase.co")]);
        let err = BackofficeConfig::from_source(&env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SUPABASE_KEY"));
    }

    #[test]
    fn test_from_source_rejects_bad_url() {
        let env = source(&[("SUPABASE_URL", "not a url"), ("SUPABASE_KEY", GOOD_KEY)]);
        assert!(matches!(
            BackofficeConfig::from_source(&env),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));

        let env = source(&[
            ("SUPABASE_URL", "ftp://abc.supabase.co"),
            ("SUPABASE_KEY", GOOD_KEY),
        ]);
        assert!(matches!(
            BackofficeConfig::from_source(&env),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_from_source_rejects_zero_timeout() {
        let env = source(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", GOOD_KEY),
            ("SUPABASE_TIMEOUT_SECS", "0"),
        ]);
        assert!(BackofficeConfig::from_source(&env).is_err());
    }

    #[test]
    fn test_from_source_rejects_unknown_log_format() {
        let env = source(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", GOOD_KEY),
            ("LOG_FORMAT", "xml"),
        ]);
        assert!(BackofficeConfig::from_source(&env).is_err());
    }

    #[test]
    fn test_supabase_config_debug_redacts_secrets() {
        let config =
            SupabaseConfig::new("https://abc.supabase.co", SecretString::from(GOOD_KEY)).unwrap();

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("abc.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(GOOD_KEY));
    }
}
