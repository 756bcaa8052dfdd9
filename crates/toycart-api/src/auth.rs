//! Bearer token verification and the caller-identity extractor.
//!
//! Tokens are compact HS256 tokens: `header.claims.signature`, each segment
//! base64url without padding. The claims carry the numeric user id (`uid`)
//! and an expiry in unix seconds (`exp`).

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use toycart_core::clock::{Clock, SystemClock};
use toycart_core::identity::{BearerCredential, CallerIdentity, UserId};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Reasons a bearer token is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token does not have three base64url segments.
    #[error("malformed token")]
    Malformed,

    /// The header names an algorithm other than HS256.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The signature does not match the header and claims.
    #[error("invalid signature")]
    InvalidSignature,

    /// The token's `exp` is not in the future.
    #[error("token expired")]
    Expired,

    /// The claims are not valid JSON or carry an invalid user id.
    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    /// The signing key was rejected by the MAC.
    #[error("invalid signing key")]
    InvalidKey,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The numeric user id.
    pub uid: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// Verifies (and, for tooling and tests, issues) HS256 bearer tokens.
pub struct TokenVerifier {
    secret: SecretString,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Creates a verifier checking expiry against the wall clock.
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Creates a verifier checking expiry against `clock`.
    #[must_use]
    pub fn with_clock(secret: SecretString, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::InvalidKey)
    }

    /// Signs `claims` into a compact token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the MAC rejects the key, or
    /// `TokenError::InvalidClaims` if the claims cannot be serialized.
    pub fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header = TokenHeader {
            alg: ALGORITHM.to_owned(),
            typ: Some("JWT".to_owned()),
        };
        let header = serde_json::to_vec(&header)
            .map_err(|e| TokenError::InvalidClaims(e.to_string()))?;
        let claims =
            serde_json::to_vec(claims).map_err(|e| TokenError::InvalidClaims(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verifies a compact token and returns the user it names.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the token is malformed, signed with another
    /// key or algorithm, expired, or names an invalid user id.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let (signing_input, signature) =
            token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (header, claims) = signing_input
            .split_once('.')
            .ok_or(TokenError::Malformed)?;
        if claims.contains('.') {
            return Err(TokenError::Malformed);
        }

        let header: TokenHeader = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: TokenClaims = decode_segment(claims)?;
        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        UserId::new(claims.uid).map_err(|e| TokenError::InvalidClaims(e.to_string()))
    }

    /// Resolves an `Authorization` header value into a caller identity. The
    /// full header value is kept as the forwardable credential.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if the value is not a bearer token, or
    /// any error from `verify`.
    pub fn authenticate(&self, header_value: &str) -> Result<CallerIdentity, TokenError> {
        let token = bearer_token(header_value).ok_or(TokenError::Malformed)?;
        let user_id = self.verify(token)?;
        Ok(CallerIdentity::new(
            user_id,
            BearerCredential::new(header_value),
        ))
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::InvalidClaims(e.to_string()))
}

fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Extractor yielding the verified caller, if any.
///
/// Never rejects: a missing, malformed, forged or expired token yields
/// `MaybeCaller(None)` and the cart operations decide what that means.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<CallerIdentity>);

impl<S> FromRequestParts<S> for MaybeCaller
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self(None));
        };
        let Ok(value) = value.to_str() else {
            debug!("authorization header is not visible ASCII");
            return Ok(Self(None));
        };

        let verifier = Arc::<TokenVerifier>::from_ref(state);
        match verifier.authenticate(value) {
            Ok(caller) => Ok(Self(Some(caller))),
            Err(err) => {
                debug!(error = %err, "bearer token rejected");
                Ok(Self(None))
            }
        }
    }
}
