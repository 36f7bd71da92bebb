//! Installed-application OAuth flow against Google's authorization server.
//!
//! The consent page redirects back to a short-lived listener on the loopback
//! interface, which hands the authorization code to the token endpoint.

use crate::error::{authorization_error, other_error, Error, ImportResult};
use reqwest::Client;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Page shown in the browser once the code has been received
const SUCCESS_PAGE: &str =
    "The authentication flow has completed. You may close this window.";

/// OAuth client registered in the Google Cloud console
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

pub(crate) fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Layout of the client secret JSON downloaded from the console
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Read an "installed" or "web" client secret file
    pub fn from_file(path: &Path) -> ImportResult<Self> {
        if !path.exists() {
            return Err(Error::MissingClientSecret(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ImportResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(content)?;
        file.installed.or(file.web).ok_or_else(|| {
            authorization_error("Client secret file has no \"installed\" or \"web\" section")
        })
    }
}

/// Successful response of the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// POST a form to the token endpoint
pub async fn request_token(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> ImportResult<TokenResponse> {
    let response = client
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| authorization_error(&format!("Token request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(authorization_error(&format!(
            "Token request failed: HTTP {} - {}",
            status, error_body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| authorization_error(&format!("Failed to parse token response: {}", e)))
}

/// Consent page URL for the given redirect and scopes
pub fn authorization_url(
    secret: &ClientSecret,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> ImportResult<Url> {
    let scope = scopes.join(" ");
    Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| authorization_error(&format!("Invalid auth_uri {}: {}", secret.auth_uri, e)))
}

/// Extract the authorization code from a redirect request path.
///
/// Returns `Ok(None)` for requests that are not the OAuth redirect at all.
pub fn parse_callback(request_path: &str, expected_state: &str) -> ImportResult<Option<String>> {
    let base = Url::parse("http://localhost/").map_err(|e| other_error(&e.to_string()))?;
    let url = base
        .join(request_path)
        .map_err(|e| authorization_error(&format!("Malformed callback {}: {}", request_path, e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(authorization_error(&format!("Authorization denied: {}", error)));
    }
    let Some(code) = code else {
        return Ok(None);
    };
    if state.as_deref() != Some(expected_state) {
        return Err(authorization_error("State mismatch in authorization callback"));
    }

    Ok(Some(code))
}

/// Run the consent flow through a loopback listener and exchange the code.
///
/// Blocks until the browser is redirected back.
pub async fn run_local_server(
    client: &Client,
    secret: &ClientSecret,
    scopes: &[String],
) -> ImportResult<TokenResponse> {
    let server = tiny_http::Server::http("127.0.0.1:0")
        .map_err(|e| authorization_error(&format!("Failed to start callback listener: {}", e)))?;
    let port = server
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .ok_or_else(|| authorization_error("Callback listener has no TCP address"))?;
    let redirect_uri = loopback_redirect_uri(port);

    // Random state guards against forged redirects
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = authorization_url(secret, &redirect_uri, scopes, &state)?;

    println!("Please visit this URL to authorize this application: {}", auth_url);
    if let Err(e) = webbrowser::open(auth_url.as_str()) {
        warn!("Could not open a browser: {}", e);
    }

    info!("Waiting for authorization callback on port {}", port);
    let code = tokio::task::spawn_blocking(move || wait_for_code(&server, &state))
        .await
        .map_err(|e| other_error(&format!("Callback listener task failed: {}", e)))??;

    exchange_code(client, secret, &code, &redirect_uri).await
}

/// Redirect target on the same address the listener binds
fn loopback_redirect_uri(port: u16) -> String {
    format!("http://127.0.0.1:{}/", port)
}

/// Trade an authorization code for tokens
pub async fn exchange_code(
    client: &Client,
    secret: &ClientSecret,
    code: &str,
    redirect_uri: &str,
) -> ImportResult<TokenResponse> {
    request_token(
        client,
        &secret.token_uri,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
        ],
    )
    .await
}

/// Serve requests until the redirect carrying the code (or an error) arrives
fn wait_for_code(server: &tiny_http::Server, state: &str) -> ImportResult<String> {
    loop {
        let request = server.recv()?;
        let path = request.url().to_string();

        match parse_callback(&path, state) {
            Ok(Some(code)) => {
                request.respond(tiny_http::Response::from_string(SUCCESS_PAGE))?;
                return Ok(code);
            }
            Ok(None) => {
                debug!("Ignoring request to {}", path);
                let not_found = tiny_http::Response::from_string("Not found").with_status_code(404);
                request.respond(not_found)?;
            }
            Err(e) => {
                request.respond(
                    tiny_http::Response::from_string(e.to_string()).with_status_code(400),
                )?;
                return Err(e);
            }
        }
    }
}
