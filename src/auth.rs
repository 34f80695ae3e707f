//! Interactive PKCE authorization flow and the non-interactive refresh flow.
//!
//! The authorization flow is a typestate: a flow without an authorization
//! code can only build the authorization URL and collect the pasted
//! redirect; only a flow holding a code can exchange it for tokens.

use std::io;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pkce;
use crate::store::{TokenPair, TokenStore};

const VERIFIER_LENGTH: usize = 64;
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);
const REFRESH_TIMEOUT: Duration = Duration::from_secs(20);

/// Run the whole interactive flow: open the browser, wait for the pasted
/// redirect url, exchange the code, and persist the resulting pair. A failed
/// save is logged but does not discard the freshly obtained tokens.
pub async fn authenticate(config: &Config, store: &TokenStore) -> Result<TokenPair> {
    let pair = AuthFlow::new(config.clone())?
        .read_redirect_url()?
        .exchange(&reqwest::Client::new())
        .await?;
    println!("Got access token!");

    if let Err(e) = store.save(&pair) {
        eprintln!("could not store tokens: {e}");
    }

    Ok(pair)
}

/// Exchange a refresh token for a new pair. Single attempt, no retry; the
/// provider may rotate the refresh token, so the returned pair replaces the
/// stored one entirely. Callers must not persist anything on failure.
pub async fn refresh(
    config: &Config,
    http: &reqwest::Client,
    refresh_token: &str,
) -> Result<TokenPair> {
    let response = http
        .post(config.token_endpoint())
        .header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        )
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", config.client_id.as_str()),
        ])
        .timeout(REFRESH_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::RefreshFailed(status));
    }

    serde_json::from_str(&response.text().await?)
        .map_err(|e| Error::MalformedResponse(e.to_string()))
}

pub struct AuthCodeNotPresent;
pub struct AuthCodePresent(String);

pub trait AuthCodeStates: private::Sealed {}
impl AuthCodeStates for AuthCodeNotPresent {}
impl AuthCodeStates for AuthCodePresent {}

pub struct AuthFlow<AuthCodeState>
where
    AuthCodeState: AuthCodeStates,
{
    config: Config,
    verifier: String,
    code: AuthCodeState,
}

impl AuthFlow<AuthCodeNotPresent> {
    /// Generates a fresh PKCE verifier; one flow per authorization attempt.
    pub fn new(config: Config) -> Result<AuthFlow<AuthCodeNotPresent>> {
        Ok(AuthFlow {
            config,
            verifier: pkce::generate_verifier(VERIFIER_LENGTH)?,
            code: AuthCodeNotPresent,
        })
    }

    pub fn authorize_url(&self) -> Result<Url> {
        let params = serde_urlencoded::to_string(AuthCodeRequest::new(self))?;
        Ok(Url::parse(&format!(
            "{}?{}",
            self.config.authorize_endpoint(),
            params
        ))?)
    }

    /// Open the authorization prompt in a browser and block, without
    /// timeout, until the user pastes the url they were redirected to.
    pub fn read_redirect_url(self) -> Result<AuthFlow<AuthCodePresent>> {
        let url = self.authorize_url()?;

        println!("Opening browser");
        if webbrowser::open(url.as_str()).is_err() {
            eprintln!("could not open a browser, visit this url manually:\n{url}");
        }

        println!("Paste the entire url after login:");
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        self.parse_redirect_url(line.trim())
    }

    /// Parse the pasted redirect url. Empty input is a cancellation; an
    /// `error` query parameter or a missing `code` means the user denied
    /// access, and no token exchange is attempted.
    pub fn parse_redirect_url(self, pasted: &str) -> Result<AuthFlow<AuthCodePresent>> {
        if pasted.is_empty() {
            return Err(Error::Cancelled);
        }

        let url = Url::parse(pasted)?;
        let callback: AuthCodeCallback =
            serde_urlencoded::from_str(url.query().unwrap_or(""))
                .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        if let Some(error) = callback.error {
            return Err(Error::AuthorizationDenied(error));
        }

        match callback.code {
            Some(code) => Ok(self.add_code(code)),
            None => Err(Error::AuthorizationDenied(
                "no code in redirect url".to_string(),
            )),
        }
    }

    fn add_code(self, code: String) -> AuthFlow<AuthCodePresent> {
        AuthFlow {
            config: self.config,
            verifier: self.verifier,
            code: AuthCodePresent(code),
        }
    }
}

impl AuthFlow<AuthCodePresent> {
    pub fn code(&self) -> &str {
        &self.code.0
    }

    /// Exchange the authorization code for a token pair, proving possession
    /// of the verifier the challenge was derived from.
    pub async fn exchange(self, http: &reqwest::Client) -> Result<TokenPair> {
        let response = http
            .post(self.config.token_endpoint())
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", self.code.0.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("code_verifier", self.verifier.as_str()),
            ])
            .timeout(EXCHANGE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::TokenExchangeFailed(status));
        }

        serde_json::from_str(&response.text().await?)
            .map_err(|e| Error::MalformedResponse(e.to_string()))
    }
}

#[derive(Serialize)]
struct AuthCodeRequest {
    client_id: String,
    response_type: String,
    code_challenge_method: String,
    code_challenge: String,
    redirect_uri: String,
    scope: String,
}

impl AuthCodeRequest {
    fn new(flow: &AuthFlow<AuthCodeNotPresent>) -> AuthCodeRequest {
        AuthCodeRequest {
            client_id: flow.config.client_id.clone(),
            response_type: "code".to_string(),
            code_challenge_method: "S256".to_string(),
            code_challenge: pkce::derive_challenge(&flow.verifier),
            redirect_uri: flow.config.redirect_uri.clone(),
            scope: flow.config.scopes.clone(),
        }
    }
}

#[derive(Deserialize)]
struct AuthCodeCallback {
    code: Option<String>,
    error: Option<String>,
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::AuthCodeNotPresent {}
    impl Sealed for super::AuthCodePresent {}
}
