use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{AuthConfig, AuthScheme};

/// Decoded session-token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: u64,
}

/// Resolved identity for one request or connection.
///
/// Absence of a session is a normal state, not an error; resolvers that
/// need identity reject individually.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserClaims,
}

/// Verifies credentials for both transport paths.
///
/// One resolver covers both supported schemes (bearer header or session
/// cookie), selected by configuration, so the two are not duplicated
/// server bootstraps.
#[derive(Clone)]
pub struct CredentialResolver {
    scheme: AuthScheme,
    cookie_name: String,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl CredentialResolver {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            scheme: config.scheme,
            cookie_name: config.cookie_name.clone(),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Derive a session from request headers. Missing or invalid
    /// credentials yield `None`, never an error.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<Session> {
        let token = match self.scheme {
            AuthScheme::Bearer => Self::bearer_token(headers)?.to_string(),
            AuthScheme::Cookie => self.cookie_token(headers)?,
        };
        self.verify(&token)
    }

    /// Verify a raw token (also used for the WebSocket `connection_init`
    /// params, so the socket path gets the same guarantees as HTTP).
    pub fn verify(&self, token: &str) -> Option<Session> {
        match decode::<UserClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => {
                debug!(sub = %data.claims.sub, "verified session token");
                Some(Session { user: data.claims })
            }
            Err(err) => {
                warn!(error = %err, "session token verification failed");
                None
            }
        }
    }

    fn bearer_token(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }

    fn cookie_token(&self, headers: &HeaderMap) -> Option<String> {
        let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == self.cookie_name).then(|| value.to_string())
        })
    }
}
