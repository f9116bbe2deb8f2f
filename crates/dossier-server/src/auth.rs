//! Bearer-token issuing and verification.
//!
//! Tokens are compact JWTs signed with one process-wide HMAC secret:
//! - `sub` carries the user ID (a UUID string)
//! - `exp` is mandatory and checked against the clock
//! - `iss` is checked only when an issuer is configured

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dossier_config::{AuthConfig, MIN_SECRET_LEN};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a well-formed token, or a required claim is missing.
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token issuer does not match")]
    InvalidIssuer,

    /// The `sub` claim is absent or blank.
    #[error("token has no subject")]
    MissingSubject,

    /// Issue time plus lifetime does not fit in a timestamp.
    #[error("token lifetime of {0:?} is too long")]
    ExpirationOverflow(Duration),

    /// The configured secret is unusable.
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at timestamp (seconds since epoch). Optional on verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Expiration timestamp (seconds since epoch).
    pub exp: u64,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// JWT configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing/verifying tokens.
    secret: Vec<u8>,
    /// Token expiration duration.
    pub expiration: Duration,
    /// Issuer claim; required on verification when set.
    pub issuer: Option<String>,
    /// Clock skew tolerated on `exp`.
    pub leeway: Duration,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration", &self.expiration)
            .field("issuer", &self.issuer)
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl JwtConfig {
    /// Creates a configuration from raw secret bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::InvalidSecret(format!(
                "need at least {MIN_SECRET_LEN} bytes, got {}",
                secret.len()
            )));
        }

        Ok(Self {
            secret,
            expiration: Duration::from_secs(3600), // 1 hour
            issuer: None,
            leeway: Duration::ZERO,
        })
    }

    /// Creates a configuration from a base64-encoded secret.
    pub fn from_base64_secret(encoded: &str) -> Result<Self, TokenError> {
        let secret = STANDARD
            .decode(encoded.trim())
            .map_err(|e| TokenError::InvalidSecret(e.to_string()))?;
        Self::new(secret)
    }

    /// Creates a configuration from the `auth` config section.
    pub fn from_auth_config(auth: &AuthConfig) -> Result<Self, TokenError> {
        let secret = auth
            .decoded_secret()
            .map_err(|e| TokenError::InvalidSecret(e.to_string()))?;

        let mut config = Self::new(secret)?
            .with_expiration(Duration::from_secs(auth.token_ttl_secs))
            .with_leeway(Duration::from_secs(auth.leeway_secs));
        config.issuer.clone_from(&auth.issuer);
        Ok(config)
    }

    #[must_use]
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Claims for a token issued now for `subject`.
    pub fn claims_for(&self, subject: impl Into<String>) -> Result<Claims, TokenError> {
        let now = get_current_timestamp();
        let exp = now
            .checked_add(self.expiration.as_secs())
            .ok_or(TokenError::ExpirationOverflow(self.expiration))?;

        Ok(Claims {
            sub: Some(subject.into()),
            iat: Some(now),
            exp,
            iss: self.issuer.clone(),
        })
    }

    /// Creates a signed token for `subject` valid for the configured
    /// expiration.
    pub fn create_token(&self, subject: impl Into<String>) -> Result<String, TokenError> {
        self.create_token_with_claims(&self.claims_for(subject)?)
    }

    /// Signs arbitrary claims (HS256).
    pub fn create_token_with_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Builds the verifier for tokens issued under this configuration.
    pub fn verifier(&self) -> TokenVerifier {
        TokenVerifier::new(self)
    }
}

/// Verifies bearer tokens and extracts their subject.
///
/// Deterministic given the secret and the clock; no I/O.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = config.leeway.as_secs();
        validation.validate_exp = true;
        validation.validate_aud = false;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(&config.secret),
            validation,
        }
    }

    /// Verifies `raw` and returns its (non-blank) subject.
    pub fn verify(&self, raw: &str) -> Result<String, TokenError> {
        let data = decode::<Claims>(raw, &self.key, &self.validation)?;

        match data.claims.sub {
            Some(sub) if !sub.trim().is_empty() => Ok(sub),
            _ => Err(TokenError::MissingSubject),
        }
    }
}
