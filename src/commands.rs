//! The linear flows behind each subcommand.
//!
//! Provider-side failures are printed and swallowed here: the tool reports
//! what went wrong and exits cleanly rather than crashing, producing empty
//! output instead of a non-zero exit code.

use crate::auth;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::store::{TokenPair, TokenStore};

pub async fn login(config: &Config) -> Result<()> {
    let store = TokenStore::new(config.token_file.clone());
    match auth::authenticate(config, &store).await {
        Ok(_) => println!("Logged in."),
        Err(e) => eprintln!("Authentication failed: {e}"),
    }
    Ok(())
}

pub async fn refresh(config: &Config) -> Result<()> {
    let store = TokenStore::new(config.token_file.clone());
    refresh_stored(config, &store).await?;
    Ok(())
}

pub async fn list_tracks(config: &Config) -> Result<()> {
    let store = TokenStore::new(config.token_file.clone());
    refresh_stored(config, &store).await?;

    let client = ApiClient::new(config.clone(), store);
    for track in client.list_saved_tracks().await? {
        println!("{}", track.name);
    }
    Ok(())
}

pub async fn whoami(config: &Config) -> Result<()> {
    let store = TokenStore::new(config.token_file.clone());
    let client = ApiClient::new(config.clone(), store);
    match client.current_user().await {
        Ok(profile) => println!(
            "{} ({})",
            profile.display_name.as_deref().unwrap_or("<no display name>"),
            profile.id
        ),
        Err(e) => eprintln!("Error obtaining user data: {e}"),
    }
    Ok(())
}

/// Refresh the stored pair and persist the result, guarded: a failed or
/// incomplete refresh never overwrites stored credentials, it is reported
/// and the previously stored pair is returned instead.
pub async fn refresh_stored(config: &Config, store: &TokenStore) -> Result<TokenPair> {
    let stored = store.load()?;
    if stored.refresh_token.is_empty() {
        eprintln!("no refresh token stored, run `spotify-cli login` first");
        return Ok(stored);
    }

    match auth::refresh(config, &reqwest::Client::new(), &stored.refresh_token).await {
        Ok(pair) if pair.is_complete() => {
            println!("Token refreshed!");
            if let Err(e) = store.save(&pair) {
                eprintln!("could not store tokens: {e}");
            }
            Ok(pair)
        }
        Ok(_) => {
            eprintln!("refresh returned an incomplete token pair, keeping stored credentials");
            Ok(stored)
        }
        Err(e) => {
            eprintln!("Error refreshing token: {e}");
            Ok(stored)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config_with(accounts_url: &str, token_file: &Path) -> Config {
        Config {
            client_id: "test-client".to_string(),
            redirect_uri: "https://example.com/callback".to_string(),
            scopes: "user-library-read".to_string(),
            accounts_url: accounts_url.to_string(),
            api_base_url: "http://unused.invalid".to_string(),
            token_file: token_file.to_path_buf(),
        }
    }

    fn seed_store(dir: &tempfile::TempDir, pair: &TokenPair) -> TokenStore {
        let token_file = dir.path().join("tokens.json");
        fs::write(&token_file, serde_json::to_string(pair).unwrap()).unwrap();
        TokenStore::new(token_file)
    }

    #[tokio::test]
    async fn rejected_refresh_keeps_the_stored_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let stored = TokenPair {
            access_token: "at-valid".into(),
            refresh_token: "rt-valid".into(),
        };
        let store = seed_store(&dir, &stored);
        let config = config_with(&server.uri(), &dir.path().join("tokens.json"));

        let returned = refresh_stored(&config, &store).await.unwrap();
        assert_eq!(returned, stored);
        assert_eq!(store.load().unwrap(), stored);
    }

    #[tokio::test]
    async fn successful_refresh_replaces_the_stored_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-rotated",
                "refresh_token": "rt-rotated"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = seed_store(
            &dir,
            &TokenPair {
                access_token: "at-old".into(),
                refresh_token: "rt-old".into(),
            },
        );
        let config = config_with(&server.uri(), &dir.path().join("tokens.json"));

        let returned = refresh_stored(&config, &store).await.unwrap();
        assert_eq!(returned.access_token, "at-rotated");
        assert_eq!(returned.refresh_token, "rt-rotated");
        assert_eq!(store.load().unwrap(), returned);
    }

    #[tokio::test]
    async fn refresh_without_a_stored_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = seed_store(&dir, &TokenPair::default());
        let config = config_with(&server.uri(), &dir.path().join("tokens.json"));

        let returned = refresh_stored(&config, &store).await.unwrap();
        assert_eq!(returned, TokenPair::default());
    }
}
