#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Identity check for courier-only operations.
//!
//! A courier signs in with Google and sends the resulting ID token. The
//! token is resolved through Google's `tokeninfo` endpoint, then accepted
//! only if its audience is our OAuth client id and its email is on the
//! configured allow-list. Order mutations are refused upstream of the order
//! service unless this check passes.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

/// Google's token introspection endpoint.
pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Errors from identity verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider refused the token (expired, malformed, forged).
    #[error("Invalid token")]
    InvalidToken,

    /// The token was issued for a different OAuth client.
    #[error("Invalid client ID")]
    AudienceMismatch {
        /// The audience the token carried.
        audience: String,
    },

    /// The token is valid but its email is not allowed.
    #[error("Unauthorized email")]
    EmailNotAllowed {
        /// The rejected email.
        email: String,
    },

    /// The identity provider could not be reached.
    #[error("Token verification failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AuthError {
    /// HTTP status code to answer with for this rejection.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidToken | Self::AudienceMismatch { .. } => 401,
            Self::EmailNotAllowed { .. } => 403,
            Self::Transport(_) => 500,
        }
    }
}

/// Claims of a resolved ID token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// OAuth client the token was issued for.
    pub aud: String,
    /// Signed-in account's email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Resolves an ID token into its claims.
#[async_trait::async_trait]
pub trait TokenInspector: Send + Sync {
    /// Returns the token's claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the provider rejects the token
    /// or [`AuthError::Transport`] if it cannot be reached.
    async fn inspect(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// [`TokenInspector`] backed by Google's `tokeninfo` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTokenInfo {
    client: reqwest::Client,
    url: String,
}

impl GoogleTokenInfo {
    /// Creates an inspector using the public `tokeninfo` endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, GOOGLE_TOKENINFO_URL)
    }

    /// Creates an inspector against a custom endpoint.
    #[must_use]
    pub fn with_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenInspector for GoogleTokenInfo {
    async fn inspect(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("id_token", token)])
            .send()
            .await?;

        if !resp.status().is_success() {
            log::debug!("tokeninfo rejected token with status {}", resp.status());
            return Err(AuthError::InvalidToken);
        }

        let body: serde_json::Value = resp.json().await?;
        serde_json::from_value(body).map_err(|e| {
            log::debug!("tokeninfo response missing claims: {e}");
            AuthError::InvalidToken
        })
    }
}

/// A verified courier identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// The allow-listed email.
    pub email: String,
}

/// Verifies tokens against a client id and an email allow-list.
pub struct Authorizer {
    inspector: Arc<dyn TokenInspector>,
    client_id: String,
    allow_list: BTreeSet<String>,
}

impl Authorizer {
    /// Creates an authorizer. Emails are compared case-insensitively.
    #[must_use]
    pub fn new(
        inspector: Arc<dyn TokenInspector>,
        client_id: impl Into<String>,
        allow_list: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            inspector,
            client_id: client_id.into(),
            allow_list: allow_list
                .into_iter()
                .map(|e| normalize_email(&e))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Whether `email` is on the allow-list.
    #[must_use]
    pub fn is_allowed(&self, email: &str) -> bool {
        self.allow_list.contains(&normalize_email(email))
    }

    /// Verifies `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the token is blank or invalid, was issued
    /// for another client, or belongs to an email not on the allow-list.
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let claims = self.inspector.inspect(token).await?;

        if claims.aud != self.client_id {
            log::warn!("Rejected token issued for client {}", claims.aud);
            return Err(AuthError::AudienceMismatch {
                audience: claims.aud,
            });
        }

        let email = claims.email.unwrap_or_default();
        if !self.is_allowed(&email) {
            log::warn!("Rejected token for unlisted email '{email}'");
            return Err(AuthError::EmailNotAllowed { email });
        }

        log::info!("Verified courier {email}");
        Ok(VerifiedIdentity { email })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticInspector(Option<TokenClaims>);

    #[async_trait::async_trait]
    impl TokenInspector for StaticInspector {
        async fn inspect(&self, _token: &str) -> Result<TokenClaims, AuthError> {
            self.0.clone().ok_or(AuthError::InvalidToken)
        }
    }

    fn authorizer(claims: Option<TokenClaims>) -> Authorizer {
        Authorizer::new(
            Arc::new(StaticInspector(claims)),
            "client-123",
            vec!["courier@example.com".to_string(), " ".to_string()],
        )
    }

    fn claims(aud: &str, email: &str) -> Option<TokenClaims> {
        Some(TokenClaims {
            aud: aud.to_string(),
            email: Some(email.to_string()),
        })
    }

    #[tokio::test]
    async fn accepts_allow_listed_email() {
        let auth = authorizer(claims("client-123", "Courier@Example.com"));
        let identity = auth.verify("tok").await.unwrap();
        assert_eq!(identity.email, "Courier@Example.com");
    }

    #[tokio::test]
    async fn rejects_wrong_audience_with_401() {
        let auth = authorizer(claims("other-client", "courier@example.com"));
        let err = auth.verify("tok").await.unwrap_err();
        assert!(matches!(err, AuthError::AudienceMismatch { .. }));
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn rejects_unlisted_email_with_403() {
        let auth = authorizer(claims("client-123", "someone@example.com"));
        let err = auth.verify("tok").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailNotAllowed { .. }));
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn rejects_missing_email() {
        let auth = authorizer(Some(TokenClaims {
            aud: "client-123".to_string(),
            email: None,
        }));
        assert!(matches!(
            auth.verify("tok").await,
            Err(AuthError::EmailNotAllowed { .. })
        ));
    }

    #[tokio::test]
    async fn rejects_invalid_and_blank_tokens() {
        let auth = authorizer(None);
        assert!(matches!(
            auth.verify("tok").await,
            Err(AuthError::InvalidToken)
        ));
        let auth = authorizer(claims("client-123", "courier@example.com"));
        assert!(matches!(auth.verify("  ").await, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn blank_allow_list_entries_are_ignored() {
        let auth = authorizer(None);
        assert!(!auth.is_allowed(""));
        assert!(auth.is_allowed("courier@example.com"));
    }

    #[test]
    fn parses_tokeninfo_claims() {
        let body = serde_json::json!({
            "aud": "client-123",
            "email": "courier@example.com",
            "email_verified": "true",
            "exp": "1700000000"
        });
        let claims: TokenClaims = serde_json::from_value(body).unwrap();
        assert_eq!(claims.aud, "client-123");
        assert_eq!(claims.email.as_deref(), Some("courier@example.com"));
    }
}
