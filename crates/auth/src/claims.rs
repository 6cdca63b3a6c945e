use core::str::FromStr;

use chrono::{DateTime, Utc};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use hackathon_core::DomainError;

/// Session token claims.
///
/// `exp` and `iat` are seconds since the epoch. Some issuers encode them with a
/// fractional part, so they are carried as `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    pub exp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,
}

/// The expiry claim on its own. Read before the signature is checked, so an
/// expired token is reported as expired whoever signed it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub(crate) struct ExpiryClaim {
    pub exp: f64,
}

impl ExpiryClaim {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= epoch_seconds(now)
    }
}

pub(crate) fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

/// The single HMAC algorithm tokens must be signed with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TokenAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

impl TokenAlgorithm {
    pub fn as_jwt(self) -> Algorithm {
        match self {
            TokenAlgorithm::Hs256 => Algorithm::HS256,
            TokenAlgorithm::Hs384 => Algorithm::HS384,
            TokenAlgorithm::Hs512 => Algorithm::HS512,
        }
    }
}

impl FromStr for TokenAlgorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(TokenAlgorithm::Hs256),
            "HS384" => Ok(TokenAlgorithm::Hs384),
            "HS512" => Ok(TokenAlgorithm::Hs512),
            other => Err(DomainError::validation(format!(
                "unsupported token algorithm '{other}'"
            ))),
        }
    }
}
