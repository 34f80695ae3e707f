use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

use crate::error::Result;

// client_id for the app registered in the dev-dashboard
const DEFAULT_CLIENT_ID: &str = "4fef09bdb7c74a278129cc8304da0986";

// uri where spotify's login screen redirects to
const DEFAULT_REDIRECT_URI: &str = "https://krishs-site.netlify.app/test";

const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

const SCOPES: &str =
    "user-library-read user-read-private user-read-email user-read-playback-state";

/// Everything that was a global constant in the original script, passed
/// explicitly into each component instead. The base URLs are overridable so
/// tests can point at a mock server.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: String,
    pub accounts_url: String,
    pub api_base_url: String,
    pub token_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        dotenv().ok();

        let token_file = match env::var("SPOTIFY_TOKEN_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("spotify-cli")
                .join("tokens.json"),
        };

        Ok(Config {
            client_id: env::var("SPOTIFY_CLIENT_ID")
                .unwrap_or_else(|_| DEFAULT_CLIENT_ID.to_string()),
            redirect_uri: env::var("SPOTIFY_REDIRECT_URI")
                .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string()),
            scopes: SCOPES.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_file,
        })
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}/authorize", self.accounts_url)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/api/token", self.accounts_url)
    }
}
