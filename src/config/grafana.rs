//! Grafana connection configuration
//!
//! Connection values are gathered into [`ConnectionSettings`] (every field
//! optional) from two places: settings passed explicitly by the caller and the
//! `GRAFANA_*` environment variables. Explicit values win field by field.
//! [`GrafanaConfig::from_settings`] then validates the merged settings and
//! produces the immutable configuration the HTTP client is built from.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer};

use super::error::{ConfigError, ValidationError};

/// Fixed timeout applied to every Grafana request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Organization used when none is configured.
pub const DEFAULT_ORG_ID: &str = "1";

/// Raw, unvalidated connection settings.
///
/// Empty strings are treated the same as absent values when merging and
/// validating.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionSettings {
    /// Grafana base URL (`GRAFANA_URL`)
    pub url: Option<String>,

    /// Bearer token (`GRAFANA_TOKEN`)
    pub token: Option<String>,

    /// Basic-auth login (`GRAFANA_EMAIL`)
    pub email: Option<String>,

    /// Basic-auth password (`GRAFANA_PASSWORD`)
    pub password: Option<String>,

    /// Organization id (`GRAFANA_ORG_ID`)
    pub org_id: Option<String>,

    /// Datasource used by metric queries when none is given (`GRAFANA_DEFAULT_DATASOURCE_UID`)
    pub default_datasource_uid: Option<String>,

    /// TLS certificate verification (`GRAFANA_VERIFY_SSL`)
    #[serde(default, deserialize_with = "deserialize_verify_flag")]
    pub verify_ssl: Option<bool>,
}

impl ConnectionSettings {
    /// Read settings from `GRAFANA_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the environment cannot be read into settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("GRAFANA"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Merge with `fallback`, keeping this value's fields where they are set.
    pub fn or(self, fallback: ConnectionSettings) -> ConnectionSettings {
        ConnectionSettings {
            url: non_empty(self.url).or(non_empty(fallback.url)),
            token: non_empty(self.token).or(non_empty(fallback.token)),
            email: non_empty(self.email).or(non_empty(fallback.email)),
            password: non_empty(self.password).or(non_empty(fallback.password)),
            org_id: non_empty(self.org_id).or(non_empty(fallback.org_id)),
            default_datasource_uid: non_empty(self.default_datasource_uid)
                .or(non_empty(fallback.default_datasource_uid)),
            verify_ssl: self.verify_ssl.or(fallback.verify_ssl),
        }
    }
}

/// Authentication scheme used for every request.
#[derive(Clone)]
pub enum GrafanaAuth {
    /// `Authorization: Bearer <token>`
    Token(Secret<String>),
    /// HTTP basic auth with email and password
    Basic {
        email: String,
        password: Secret<String>,
    },
}

impl GrafanaAuth {
    /// Returns which scheme this is.
    pub fn method(&self) -> AuthMethod {
        match self {
            GrafanaAuth::Token(_) => AuthMethod::Token,
            GrafanaAuth::Basic { .. } => AuthMethod::Basic,
        }
    }

    /// Exposes the bearer token, if token auth is in use.
    pub(crate) fn bearer_token(&self) -> Option<&str> {
        match self {
            GrafanaAuth::Token(token) => Some(token.expose_secret()),
            GrafanaAuth::Basic { .. } => None,
        }
    }

    /// Exposes the basic-auth pair, if basic auth is in use.
    pub(crate) fn basic_credentials(&self) -> Option<(&str, &str)> {
        match self {
            GrafanaAuth::Token(_) => None,
            GrafanaAuth::Basic { email, password } => {
                Some((email.as_str(), password.expose_secret().as_str()))
            }
        }
    }
}

impl fmt::Debug for GrafanaAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrafanaAuth::Token(_) => f.write_str("Token([REDACTED])"),
            GrafanaAuth::Basic { email, .. } => f
                .debug_struct("Basic")
                .field("email", email)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Authentication method name, as reported at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Token,
    Basic,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Token => f.write_str("token"),
            AuthMethod::Basic => f.write_str("basic"),
        }
    }
}

/// Validated, immutable Grafana connection configuration.
#[derive(Debug, Clone)]
pub struct GrafanaConfig {
    /// Base URL with one trailing slash removed
    pub base_url: String,

    /// Resolved authentication scheme
    pub auth: GrafanaAuth,

    /// Organization id
    pub org_id: String,

    /// Fallback datasource for metric queries
    pub default_datasource_uid: Option<String>,

    /// Whether TLS certificates are verified
    pub verify_ssl: bool,

    /// Per-request timeout
    pub timeout: Duration,
}

impl GrafanaConfig {
    /// Validate merged settings.
    ///
    /// Token auth is preferred when both a token and an email/password pair
    /// are present; a warning is logged in that case.
    ///
    /// # Errors
    ///
    /// - `ValidationError::MissingBaseUrl` if the URL is empty
    /// - `ValidationError::MissingCredentials` if neither a token nor a
    ///   complete email/password pair is present
    pub fn from_settings(settings: ConnectionSettings) -> Result<Self, ValidationError> {
        let base_url = normalize_base_url(settings.url.as_deref().unwrap_or_default());
        if base_url.is_empty() {
            return Err(ValidationError::MissingBaseUrl);
        }

        let token = non_empty(settings.token);
        let basic = non_empty(settings.email).zip(non_empty(settings.password));

        let auth = match (token, basic) {
            (Some(token), Some(_)) => {
                tracing::warn!(
                    "Both token and email/password provided. Using token authentication (preferred)."
                );
                GrafanaAuth::Token(Secret::new(token))
            }
            (Some(token), None) => GrafanaAuth::Token(Secret::new(token)),
            (None, Some((email, password))) => GrafanaAuth::Basic {
                email,
                password: Secret::new(password),
            },
            (None, None) => return Err(ValidationError::MissingCredentials),
        };

        Ok(Self {
            base_url,
            auth,
            org_id: non_empty(settings.org_id).unwrap_or_else(|| DEFAULT_ORG_ID.to_string()),
            default_datasource_uid: non_empty(settings.default_datasource_uid),
            verify_ssl: settings.verify_ssl.unwrap_or(true),
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Resolve explicit settings against the environment and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the environment cannot be read or the merged
    /// settings fail validation.
    pub fn resolve(explicit: ConnectionSettings) -> Result<Self, ConfigError> {
        let settings = explicit.or(ConnectionSettings::from_env()?);
        Ok(Self::from_settings(settings)?)
    }

    /// Returns the active authentication method.
    pub fn auth_method(&self) -> AuthMethod {
        self.auth.method()
    }
}

/// Strip exactly one trailing slash from a base URL.
pub fn normalize_base_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Accepts a boolean, or a string where only `false` (any case) disables verification.
fn deserialize_verify_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Bool(value) => value,
        Flag::Text(text) => !text.trim().eq_ignore_ascii_case("false"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 7] = [
        "GRAFANA_URL",
        "GRAFANA_TOKEN",
        "GRAFANA_EMAIL",
        "GRAFANA_PASSWORD",
        "GRAFANA_ORG_ID",
        "GRAFANA_DEFAULT_DATASOURCE_UID",
        "GRAFANA_VERIFY_SSL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    fn token_settings() -> ConnectionSettings {
        ConnectionSettings {
            url: Some("https://grafana.example.com".to_string()),
            token: Some("glsa_test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_base_url_is_rejected_even_with_credentials() {
        let settings = ConnectionSettings {
            url: Some(String::new()),
            ..token_settings()
        };
        assert_eq!(
            GrafanaConfig::from_settings(settings).unwrap_err(),
            ValidationError::MissingBaseUrl
        );
    }

    #[test]
    fn missing_base_url_is_rejected() {
        let settings = ConnectionSettings {
            url: None,
            ..token_settings()
        };
        assert_eq!(
            GrafanaConfig::from_settings(settings).unwrap_err(),
            ValidationError::MissingBaseUrl
        );
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let settings = ConnectionSettings {
            url: Some("https://grafana.example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            GrafanaConfig::from_settings(settings).unwrap_err(),
            ValidationError::MissingCredentials
        );
    }

    #[test]
    fn incomplete_basic_pair_is_rejected() {
        let settings = ConnectionSettings {
            url: Some("https://grafana.example.com".to_string()),
            email: Some("admin@example.com".to_string()),
            password: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            GrafanaConfig::from_settings(settings).unwrap_err(),
            ValidationError::MissingCredentials
        );
    }

    #[test]
    fn basic_auth_is_used_without_token() {
        let settings = ConnectionSettings {
            url: Some("https://grafana.example.com".to_string()),
            email: Some("admin@example.com".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        };
        let config = GrafanaConfig::from_settings(settings).unwrap();

        assert_eq!(config.auth_method(), AuthMethod::Basic);
        assert_eq!(
            config.auth.basic_credentials(),
            Some(("admin@example.com", "secret"))
        );
    }

    #[test]
    fn token_is_preferred_when_both_are_present() {
        let settings = ConnectionSettings {
            email: Some("admin@example.com".to_string()),
            password: Some("secret".to_string()),
            ..token_settings()
        };
        let config = GrafanaConfig::from_settings(settings).unwrap();

        assert_eq!(config.auth_method(), AuthMethod::Token);
        assert_eq!(config.auth.bearer_token(), Some("glsa_test"));
        assert!(config.auth.basic_credentials().is_none());
    }

    #[test]
    fn defaults_are_applied() {
        let config = GrafanaConfig::from_settings(token_settings()).unwrap();

        assert_eq!(config.org_id, "1");
        assert!(config.verify_ssl);
        assert!(config.default_datasource_uid.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let config = GrafanaConfig::from_settings(token_settings()).unwrap();
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("glsa_test"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn explicit_settings_override_fallback_field_by_field() {
        let explicit = ConnectionSettings {
            url: Some("https://explicit.example.com".to_string()),
            token: Some(String::new()),
            ..Default::default()
        };
        let fallback = ConnectionSettings {
            url: Some("https://env.example.com".to_string()),
            token: Some("env-token".to_string()),
            org_id: Some("7".to_string()),
            ..Default::default()
        };

        let merged = explicit.or(fallback);

        assert_eq!(merged.url.as_deref(), Some("https://explicit.example.com"));
        assert_eq!(merged.token.as_deref(), Some("env-token"));
        assert_eq!(merged.org_id.as_deref(), Some("7"));
    }

    #[test]
    fn trailing_slash_is_stripped_once() {
        assert_eq!(normalize_base_url("https://g.example.com/"), "https://g.example.com");
        assert_eq!(normalize_base_url("https://g.example.com//"), "https://g.example.com/");
        assert_eq!(normalize_base_url("https://g.example.com"), "https://g.example.com");
    }

    proptest! {
        #[test]
        fn normalization_removes_one_slash_and_is_stable(base in "[a-z]{1,12}(\\.[a-z]{1,8}){0,2}") {
            let url = format!("https://{}", base);
            prop_assert_eq!(normalize_base_url(&format!("{}/", url)), url.clone());
            prop_assert_eq!(normalize_base_url(&url), url);
        }
    }

    #[test]
    fn from_env_reads_grafana_variables() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("GRAFANA_URL", "https://grafana.example.com/");
        env::set_var("GRAFANA_TOKEN", "env-token");
        env::set_var("GRAFANA_ORG_ID", "3");
        env::set_var("GRAFANA_DEFAULT_DATASOURCE_UID", "prom-main");
        env::set_var("GRAFANA_VERIFY_SSL", "FALSE");
        let result = ConnectionSettings::from_env();
        clear_env();

        let settings = result.unwrap();
        assert_eq!(settings.url.as_deref(), Some("https://grafana.example.com/"));
        assert_eq!(settings.org_id.as_deref(), Some("3"));
        assert_eq!(settings.default_datasource_uid.as_deref(), Some("prom-main"));
        assert_eq!(settings.verify_ssl, Some(false));

        let config = GrafanaConfig::from_settings(settings).unwrap();
        assert_eq!(config.base_url, "https://grafana.example.com");
        assert!(!config.verify_ssl);
    }

    #[test]
    fn verify_flag_stays_enabled_for_other_strings() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("GRAFANA_VERIFY_SSL", "no");
        let result = ConnectionSettings::from_env();
        clear_env();

        assert_eq!(result.unwrap().verify_ssl, Some(true));
    }

    #[test]
    fn resolve_prefers_explicit_over_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("GRAFANA_URL", "https://env.example.com");
        env::set_var("GRAFANA_TOKEN", "env-token");
        let result = GrafanaConfig::resolve(ConnectionSettings {
            url: Some("https://explicit.example.com/".to_string()),
            ..Default::default()
        });
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.base_url, "https://explicit.example.com");
        assert_eq!(config.auth.bearer_token(), Some("env-token"));
    }
}
