//! Service-account authentication - infrastructure layer
//!
//! Reads a Google service-account key file once at startup and exchanges a
//! signed RS256 JWT for a short-lived bearer token (OAuth2 `jwt-bearer` grant).

use std::fmt;
use std::path::Path;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SecretString;
use crate::error::{RemoteFault, SetupError};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Lifetime requested for each assertion, the maximum Google accepts
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The fields of a service-account key file that matter here
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"***")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| SetupError::ReadFailed {
            path: label.clone(),
            source,
        })?;
        Self::from_json(&label, &content)
    }

    pub fn from_json(path: &str, json: &str) -> Result<Self, SetupError> {
        serde_json::from_str(json).map_err(|source| SetupError::ParseFailed {
            path: path.to_string(),
            source,
        })
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Bearer token source for the Google APIs
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scopes: Vec<String>,
    http: reqwest::Client,
}

impl ServiceAccountAuth {
    /// Validate the private key up front so a broken key file fails at startup
    pub fn new(
        key: ServiceAccountKey,
        key_path: &str,
        scopes: &[&str],
        http: reqwest::Client,
    ) -> Result<Self, SetupError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|_| {
            SetupError::InvalidPrivateKey {
                path: key_path.to_string(),
            }
        })?;

        Ok(Self {
            key,
            encoding_key,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            http,
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn claims(&self, now: i64) -> Claims<'_> {
        Claims {
            iss: &self.key.client_email,
            scope: self.scopes.join(" "),
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Fetch a fresh access token
    pub async fn access_token(&self) -> Result<SecretString, RemoteFault> {
        let claims = self.claims(chrono::Utc::now().timestamp());
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let assertion = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| RemoteFault::from_description(format!("jwt signing failed: {e}")))?;

        debug!("Requesting access token for {}", self.key.client_email);

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| RemoteFault::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteFault::http(
                status.as_u16(),
                format!("token exchange {status}: {body}"),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteFault::from_reqwest(&e))?;

        Ok(SecretString::new(token.access_token))
    }
}
