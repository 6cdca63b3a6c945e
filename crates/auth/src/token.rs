//! Session token validation and issuance.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use hackathon_core::{DomainError, DomainResult};

use crate::claims::{ExpiryClaim, epoch_seconds};
use crate::{Identity, SessionClaims, TokenAlgorithm};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    TokenExpired,

    #[error("malformed token claims")]
    MalformedClaims,

    #[error("identity not found")]
    IdentityNotFound,

    #[error("identity lookup failed: {0}")]
    Lookup(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Lookup(msg) | AuthError::Signing(msg) => DomainError::Internal(msg),
            other => DomainError::Unauthorized(other.to_string()),
        }
    }
}

/// Resolves a claimed email to a persisted identity.
#[async_trait::async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<Identity>>;
}

/// Output of a successful validation: the identity plus the raw token for propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub identity: Identity,
    pub token: String,
}

/// Verifies bearer tokens against a shared secret and one configured algorithm.
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    algorithm: TokenAlgorithm,
    lookup: Arc<dyn UserLookup>,
}

impl core::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    pub fn new(secret: &[u8], algorithm: TokenAlgorithm, lookup: Arc<dyn UserLookup>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            lookup,
        }
    }

    /// Check expiry, then signature, then identity. An expired token is
    /// `TokenExpired` even when its signature would not verify.
    pub async fn validate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedSession, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        if self.unverified_expiry(token).is_some_and(|c| c.is_expired_at(now)) {
            return Err(AuthError::TokenExpired);
        }

        let claims = self.verify(token)?;

        let email = claims.email.trim();
        if email.is_empty() {
            return Err(AuthError::MalformedClaims);
        }

        let identity = self
            .lookup
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Lookup(e.to_string()))?
            .ok_or(AuthError::IdentityNotFound)?;

        Ok(AuthenticatedSession {
            identity,
            token: token.to_string(),
        })
    }

    /// Reads `exp` without trusting the token. Anything unreadable is left for
    /// [`TokenValidator::verify`] to classify.
    fn unverified_expiry(&self, token: &str) -> Option<ExpiryClaim> {
        let mut validation = Validation::new(self.algorithm.as_jwt());
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<ExpiryClaim>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .ok()
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| match e.kind() {
            // The header parsed as base64 but names no algorithm we know of (e.g. "none").
            JwtErrorKind::Json(_) => AuthError::InvalidSignature,
            _ => AuthError::MalformedClaims,
        })?;
        if header.alg != self.algorithm.as_jwt() {
            return Err(AuthError::InvalidSignature);
        }

        let mut validation = Validation::new(self.algorithm.as_jwt());
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                    AuthError::InvalidSignature
                }
                _ => AuthError::MalformedClaims,
            })
    }
}

/// Signs session tokens. Login itself lives outside this crate; this is what it calls.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    algorithm: TokenAlgorithm,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], algorithm: TokenAlgorithm, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            algorithm,
            ttl,
        }
    }

    pub fn issue(&self, email: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let issued_at = epoch_seconds(now);
        let claims = SessionClaims {
            email: email.to_string(),
            exp: issued_at + self.ttl.as_secs_f64(),
            iat: Some(issued_at),
        };
        jsonwebtoken::encode(&Header::new(self.algorithm.as_jwt()), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParticipantProfile, Role};
    use chrono::Duration as ChronoDuration;
    use hackathon_core::{ParticipantId, UserId};
    use jsonwebtoken::Algorithm;
    use proptest::prelude::*;

    const SECRET: &[u8] = b"test-secret";

    struct OneUser(Identity);

    #[async_trait::async_trait]
    impl UserLookup for OneUser {
        async fn find_by_email(&self, email: &str) -> DomainResult<Option<Identity>> {
            Ok((self.0.email == email).then(|| self.0.clone()))
        }
    }

    struct BrokenLookup;

    #[async_trait::async_trait]
    impl UserLookup for BrokenLookup {
        async fn find_by_email(&self, _email: &str) -> DomainResult<Option<Identity>> {
            Err(DomainError::internal("connection refused"))
        }
    }

    fn alice() -> Identity {
        Identity {
            id: UserId::new(1),
            email: "alice@example.com".to_string(),
            role: Role::Participant,
            participant: Some(ParticipantProfile {
                id: ParticipantId::new(7),
                name: "Alice".to_string(),
            }),
        }
    }

    fn validator() -> TokenValidator {
        TokenValidator::new(SECRET, TokenAlgorithm::Hs256, Arc::new(OneUser(alice())))
    }

    fn sign(alg: Algorithm, secret: &[u8], claims: &SessionClaims) -> String {
        jsonwebtoken::encode(&Header::new(alg), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn claims_expiring_at(exp: f64) -> SessionClaims {
        SessionClaims {
            email: "alice@example.com".to_string(),
            exp,
            iat: None,
        }
    }

    #[tokio::test]
    async fn valid_token_resolves_identity_and_keeps_raw_token() {
        let now = Utc::now();
        let issuer = TokenIssuer::new(SECRET, TokenAlgorithm::Hs256, Duration::from_secs(600));
        let token = issuer.issue("alice@example.com", now).unwrap();

        let session = validator().validate(&token, now).await.unwrap();
        assert_eq!(session.identity, alice());
        assert_eq!(session.token, token);
    }

    #[tokio::test]
    async fn empty_token_is_missing() {
        let err = validator().validate("   ", Utc::now()).await.unwrap_err();
        assert_eq!(err, AuthError::MissingToken);
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid_signature() {
        let now = Utc::now();
        let claims = claims_expiring_at(epoch_seconds(now) + 60.0);
        let token = sign(Algorithm::HS256, b"other-secret", &claims);
        let err = validator().validate(&token, now).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidSignature);
    }

    #[tokio::test]
    async fn other_algorithm_is_invalid_signature_even_with_same_secret() {
        let now = Utc::now();
        let claims = claims_expiring_at(epoch_seconds(now) + 60.0);
        let token = sign(Algorithm::HS512, SECRET, &claims);
        let err = validator().validate(&token, now).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidSignature);
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let err = validator().validate("not-a-jwt", Utc::now()).await.unwrap_err();
        assert_eq!(err, AuthError::MalformedClaims);
    }

    #[tokio::test]
    async fn missing_email_claim_is_malformed() {
        let now = Utc::now();
        let payload = serde_json::json!({ "exp": epoch_seconds(now) + 60.0 });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        let err = validator().validate(&token, now).await.unwrap_err();
        assert_eq!(err, AuthError::MalformedClaims);
    }

    #[tokio::test]
    async fn unknown_email_is_identity_not_found() {
        let now = Utc::now();
        let issuer = TokenIssuer::new(SECRET, TokenAlgorithm::Hs256, Duration::from_secs(600));
        let token = issuer.issue("mallory@example.com", now).unwrap();
        let err = validator().validate(&token, now).await.unwrap_err();
        assert_eq!(err, AuthError::IdentityNotFound);
    }

    #[tokio::test]
    async fn lookup_failure_is_not_reported_as_unauthorized() {
        let now = Utc::now();
        let v = TokenValidator::new(SECRET, TokenAlgorithm::Hs256, Arc::new(BrokenLookup));
        let issuer = TokenIssuer::new(SECRET, TokenAlgorithm::Hs256, Duration::from_secs(600));
        let token = issuer.issue("alice@example.com", now).unwrap();
        let err = v.validate(&token, now).await.unwrap_err();
        assert!(matches!(err, AuthError::Lookup(_)));
        assert!(matches!(DomainError::from(err), DomainError::Internal(_)));
    }

    #[tokio::test]
    async fn expiry_equal_to_now_is_expired() {
        let now = Utc::now();
        let token = sign(Algorithm::HS256, SECRET, &claims_expiring_at(epoch_seconds(now)));
        let err = validator().validate(&token, now).await.unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);
    }

    #[tokio::test]
    async fn expired_token_is_expired_whatever_the_signature() {
        let now = Utc::now();
        let claims = claims_expiring_at(epoch_seconds(now - ChronoDuration::hours(1)));

        let forged = sign(Algorithm::HS256, b"WRONG", &claims);
        assert_eq!(validator().validate(&forged, now).await.unwrap_err(), AuthError::TokenExpired);

        let foreign_alg = sign(Algorithm::HS512, b"WRONG", &claims);
        assert_eq!(
            validator().validate(&foreign_alg, now).await.unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[tokio::test]
    async fn live_token_with_bad_signature_is_still_rejected() {
        let now = Utc::now();
        let claims = claims_expiring_at(epoch_seconds(now + ChronoDuration::hours(1)));
        let forged = sign(Algorithm::HS256, b"WRONG", &claims);
        assert_eq!(
            validator().validate(&forged, now).await.unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn auth_failures_map_to_unauthorized() {
        for err in [
            AuthError::MissingToken,
            AuthError::InvalidSignature,
            AuthError::TokenExpired,
            AuthError::MalformedClaims,
            AuthError::IdentityNotFound,
        ] {
            assert!(matches!(DomainError::from(err), DomainError::Unauthorized(_)));
        }
    }

    proptest! {
        #[test]
        fn any_past_expiry_fails_with_token_expired(secs_ago in 0i64..10_000_000, frac in 0.0f64..1.0) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let now = Utc::now();
            let exp = epoch_seconds(now - ChronoDuration::seconds(secs_ago)) - frac;
            let token = sign(Algorithm::HS256, SECRET, &claims_expiring_at(exp));
            let err = rt.block_on(validator().validate(&token, now)).unwrap_err();
            prop_assert_eq!(err, AuthError::TokenExpired);
        }

        #[test]
        fn any_foreign_algorithm_fails_with_invalid_signature(
            alg in prop_oneof![Just(Algorithm::HS384), Just(Algorithm::HS512)],
            ttl in 1i64..100_000,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let now = Utc::now();
            let exp = epoch_seconds(now + ChronoDuration::seconds(ttl));
            let token = sign(alg, SECRET, &claims_expiring_at(exp));
            let err = rt.block_on(validator().validate(&token, now)).unwrap_err();
            prop_assert_eq!(err, AuthError::InvalidSignature);
        }
    }
}
