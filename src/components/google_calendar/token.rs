use super::oauth::{self, default_token_uri, ClientSecret, TokenResponse};
use crate::config::Config;
use crate::error::{authorization_error, ImportResult};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECS: i64 = 10;

/// Authorized-user credential as kept in the token cache file.
///
/// Field names follow Google's authorized-user JSON so caches written by
/// other Google client libraries load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    /// Access token
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    /// Keys we do not interpret, written back as found
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StoredToken {
    /// Build a credential from a token endpoint response
    pub fn from_response(
        secret: &ClientSecret,
        response: TokenResponse,
        requested_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let mut token = Self {
            token: None,
            refresh_token: None,
            token_uri: secret.token_uri.clone(),
            client_id: secret.client_id.clone(),
            client_secret: secret.client_secret.clone(),
            scopes: requested_scopes.to_vec(),
            expiry: None,
            extra: serde_json::Map::new(),
        };
        token.apply_response(response, now);
        token
    }

    /// A token is usable when present and not within the skew of its expiry
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.token.is_some()
            && self
                .expiry
                .map_or(true, |expiry| now + Duration::seconds(EXPIRY_SKEW_SECS) < expiry)
    }

    /// Access token, or an error if the credential carries none
    pub fn access_token(&self) -> ImportResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| authorization_error("Credential has no access token"))
    }

    /// Merge a token endpoint response; an omitted refresh token keeps the old one
    fn apply_response(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        self.token = Some(response.access_token);
        self.expiry = response
            .expires_in
            .map(|secs| now + Duration::seconds(secs));
        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = response.scope {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
    }
}

/// Owns the token cache file and every way of obtaining a credential
#[derive(Debug, Clone)]
pub struct TokenManager {
    token_path: PathBuf,
    client_secret_path: PathBuf,
    scopes: Vec<String>,
    client: Client,
}

impl TokenManager {
    pub fn new(config: &Config) -> Self {
        Self {
            token_path: config.token_path.clone(),
            client_secret_path: config.client_secret_path.clone(),
            scopes: config.scopes.clone(),
            client: Client::new(),
        }
    }

    /// Get a valid credential from the cache, a refresh, or interactive consent
    pub async fn authorize(&self) -> ImportResult<StoredToken> {
        match self.load_cached()? {
            Some(token) if token.is_valid(Utc::now()) => {
                info!("Using cached token from {}", self.token_path.display());
                return Ok(token);
            }
            Some(token) if token.refresh_token.is_some() => {
                info!("Cached token expired, refreshing");
                match self.refresh_token(&token).await {
                    Ok(refreshed) => {
                        self.save_token(&refreshed)?;
                        return Ok(refreshed);
                    }
                    Err(e) => warn!("Token refresh failed, falling back to consent: {}", e),
                }
            }
            Some(_) => info!("Cached token expired and has no refresh token"),
            None => info!("No cached token at {}", self.token_path.display()),
        }

        let token = self.interactive_authorization().await?;
        self.save_token(&token)?;
        Ok(token)
    }

    /// Read the token cache, `None` when the file does not exist
    pub fn load_cached(&self) -> ImportResult<Option<StoredToken>> {
        if !self.token_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.token_path)?;
        let token = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    /// Overwrite the token cache with the given credential
    pub fn save_token(&self, token: &StoredToken) -> ImportResult<()> {
        let json = serde_json::to_string(token)?;
        fs::write(&self.token_path, json)?;
        info!("Saved token to {}", self.token_path.display());
        Ok(())
    }

    /// Exchange the refresh token for a new access token
    async fn refresh_token(&self, token: &StoredToken) -> ImportResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| authorization_error("No refresh token in token data"))?;

        let response = oauth::request_token(
            &self.client,
            &token.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", token.client_id.as_str()),
                ("client_secret", token.client_secret.as_str()),
            ],
        )
        .await?;

        let mut refreshed = token.clone();
        refreshed.apply_response(response, Utc::now());
        Ok(refreshed)
    }

    async fn interactive_authorization(&self) -> ImportResult<StoredToken> {
        let secret = ClientSecret::from_file(&self.client_secret_path)?;
        let response = oauth::run_local_server(&self.client, &secret, &self.scopes).await?;
        Ok(StoredToken::from_response(
            &secret,
            response,
            &self.scopes,
            Utc::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token(expiry: Option<DateTime<Utc>>) -> StoredToken {
        StoredToken {
            token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            token_uri: default_token_uri(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![],
            expiry,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_validity_window() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        assert!(token(Some(now + Duration::hours(1))).is_valid(now));
        assert!(token(None).is_valid(now));
        assert!(!token(Some(now - Duration::seconds(1))).is_valid(now));
        // Inside the skew counts as expired
        assert!(!token(Some(now + Duration::seconds(5))).is_valid(now));

        let mut missing = token(Some(now + Duration::hours(1)));
        missing.token = None;
        assert!(!missing.is_valid(now));
    }

    #[test]
    fn test_reads_authorized_user_json() {
        let json = r#"{"token": "ya29.a0", "refresh_token": "1//0g", "token_uri": "https://oauth2.googleapis.com/token", "client_id": "abc.apps.googleusercontent.com", "client_secret": "s", "scopes": ["https://www.googleapis.com/auth/calendar"], "universe_domain": "googleapis.com", "account": "", "expiry": "2024-05-01T10:00:00.123456Z"}"#;
        let token: StoredToken = serde_json::from_str(json).unwrap();

        assert_eq!(token.token.as_deref(), Some("ya29.a0"));
        let expiry = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
            + Duration::microseconds(123456);
        assert_eq!(token.expiry, Some(expiry));
        assert_eq!(
            token.extra.get("universe_domain").and_then(|v| v.as_str()),
            Some("googleapis.com")
        );

        // Unknown keys survive a rewrite
        let written = serde_json::to_value(&token).unwrap();
        assert_eq!(written["universe_domain"], "googleapis.com");
    }

    #[test]
    fn test_refresh_response_keeps_refresh_token() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut stored = token(Some(now - Duration::hours(1)));
        stored.apply_response(
            TokenResponse {
                access_token: "new-access".to_string(),
                expires_in: Some(3599),
                refresh_token: None,
                scope: None,
            },
            now,
        );

        assert_eq!(stored.token.as_deref(), Some("new-access"));
        assert_eq!(stored.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(stored.expiry, Some(now + Duration::seconds(3599)));
        assert!(stored.is_valid(now));
    }

    #[test]
    fn test_consent_response_becomes_cacheable_token() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let secret = ClientSecret {
            client_id: "abc.apps.googleusercontent.com".to_string(),
            client_secret: "s3cret".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_uri: default_token_uri(),
        };
        let scopes = vec!["https://www.googleapis.com/auth/calendar".to_string()];

        let stored = StoredToken::from_response(
            &secret,
            TokenResponse {
                access_token: "ya29.new".to_string(),
                expires_in: Some(3599),
                refresh_token: Some("1//new".to_string()),
                scope: None,
            },
            &scopes,
            now,
        );

        assert!(stored.is_valid(now));
        assert_eq!(stored.refresh_token.as_deref(), Some("1//new"));
        assert_eq!(stored.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(stored.scopes, scopes);

        // What gets written to the cache reads back unchanged
        let json = serde_json::to_string(&stored).unwrap();
        assert_eq!(serde_json::from_str::<StoredToken>(&json).unwrap(), stored);
    }
}
