//! Authenticated requests against the provider's REST endpoints.

use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::TokenStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Default, Deserialize)]
struct SavedTracksPage {
    items: Option<Vec<SavedTrackItem>>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct SavedTrackItem {
    track: Option<Track>,
}

pub struct ApiClient {
    http: reqwest::Client,
    config: Config,
    store: TokenStore,
}

impl ApiClient {
    pub fn new(config: Config, store: TokenStore) -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            config,
            store,
        }
    }

    /// GET an endpoint with a bearer token. The access token is re-read from
    /// the store on every call so a refresh between calls is picked up.
    pub async fn get_json(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value> {
        let pair = self.store.load()?;

        let response = self
            .http
            .get(format!("{}/{}", self.config.api_base_url, endpoint))
            .header(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", pair.access_token))?,
            )
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ApiRequestFailed {
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }

    pub async fn current_user(&self) -> Result<UserProfile> {
        let body = self.get_json("me", &[]).await?;
        serde_json::from_value(body).map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    /// Fetch the whole saved-track library, 50 tracks per page. A page
    /// without an `items` array stops the loop silently; a failed request
    /// mid-loop is logged and yields whatever was gathered so far.
    pub async fn list_saved_tracks(&self) -> Result<Vec<Track>> {
        let mut tracks = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let page = match self
                .get_json(
                    "me/tracks",
                    &[
                        ("limit", PAGE_LIMIT.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await
            {
                Ok(body) => serde_json::from_value::<SavedTracksPage>(body).unwrap_or_default(),
                Err(e) => {
                    eprintln!("Error obtaining user tracks: {e}");
                    break;
                }
            };

            let Some(items) = page.items else {
                break;
            };

            for item in items {
                if let Some(track) = item.track {
                    tracks.push(track);
                }
            }

            // next holds the url of the following page; null means done
            if page.next.is_none() {
                break;
            }
            offset += PAGE_LIMIT;
        }

        Ok(tracks)
    }
}
