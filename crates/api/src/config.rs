//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use hackathon_auth::{TokenAlgorithm, TokenIssuer};

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not valid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub jwt_algorithm: TokenAlgorithm,
    pub jwt_ttl: Duration,
    /// Absent means the in-memory store.
    pub database_url: Option<String>,
    pub default_page_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_algorithm: TokenAlgorithm::Hs256,
            jwt_ttl: Duration::from_secs(86_400),
            database_url: None,
            default_page_limit: 10,
        }
    }
}

impl AppConfig {
    /// Signer matching what the gate accepts, for `mint-token`.
    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer::new(self.jwt_secret.as_bytes(), self.jwt_algorithm, self.jwt_ttl)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("BIND_ADDR", format!("{e}")))?,
            None => defaults.bind_addr,
        };

        let jwt_secret = match get("JWT_SECRET") {
            Some(v) => v,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        let jwt_algorithm = match get("JWT_ALGORITHM") {
            Some(v) => v
                .parse()
                .map_err(|e| ConfigError::invalid("JWT_ALGORITHM", format!("{e}")))?,
            None => defaults.jwt_algorithm,
        };

        let jwt_ttl = match get("JWT_TTL_SECS") {
            Some(v) => {
                let secs: u64 = v
                    .trim()
                    .parse()
                    .map_err(|e| ConfigError::invalid("JWT_TTL_SECS", format!("{e}")))?;
                if secs == 0 {
                    return Err(ConfigError::invalid("JWT_TTL_SECS", "must be positive"));
                }
                Duration::from_secs(secs)
            }
            None => defaults.jwt_ttl,
        };

        let default_page_limit = match get("DEFAULT_PAGE_LIMIT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("DEFAULT_PAGE_LIMIT", format!("{e}")))?,
            None => defaults.default_page_limit,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_algorithm,
            jwt_ttl,
            database_url: get("DATABASE_URL"),
            default_page_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.jwt_algorithm, TokenAlgorithm::Hs256);
        assert_eq!(cfg.jwt_ttl, Duration::from_secs(86_400));
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.default_page_limit, 10);
    }

    #[test]
    fn values_override_defaults() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_ALGORITHM", "hs512"),
            ("JWT_TTL_SECS", "60"),
            ("DATABASE_URL", "postgres://localhost/hackathon"),
            ("DEFAULT_PAGE_LIMIT", "25"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.jwt_algorithm, TokenAlgorithm::Hs512);
        assert_eq!(cfg.jwt_ttl, Duration::from_secs(60));
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/hackathon"));
        assert_eq!(cfg.default_page_limit, 25);
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let cfg = config(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn issuer_signs_with_configured_secret_algorithm_and_ttl() {
        let cfg = config(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_ALGORITHM", "HS384"),
            ("JWT_TTL_SECS", "60"),
        ])
        .unwrap();
        let token = cfg.token_issuer().issue("ada@example.com", chrono::Utc::now()).unwrap();

        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS384);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        let claims = jsonwebtoken::decode::<hackathon_auth::SessionClaims>(
            &token,
            &jsonwebtoken::DecodingKey::from_secret(b"s3cret"),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(claims.email, "ada@example.com");
        let iat = claims.iat.unwrap();
        assert!((claims.exp - iat - 60.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        for (var, value) in [
            ("BIND_ADDR", "not-an-address"),
            ("JWT_ALGORITHM", "RS256"),
            ("JWT_TTL_SECS", "0"),
            ("JWT_TTL_SECS", "soon"),
            ("DEFAULT_PAGE_LIMIT", "-1"),
        ] {
            match config(&[(var, value)]) {
                Err(ConfigError::Invalid { var: got, .. }) => assert_eq!(got, var),
                Ok(_) => panic!("{var}={value} should be rejected"),
            }
        }
    }
}
