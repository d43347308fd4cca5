use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::RngExt;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::config::NativeConfig;
use crate::error::PlaylistError;
use crate::playlist::{HttpPlaylistFetcher, PlaylistFetcher, PlaylistRequest, VariantPlaylist};
use crate::proxy::{NativeStreams, PLAYER_ORIGIN};

const GQL_API_URL: &str = "https://gql.twitch.tv/gql";
const USHER_URL: &str = "https://usher.ttvnw.net/api/channel/hls";
const PLAYBACK_ACCESS_TOKEN_HASH: &str =
    "ed230aa1e33e07eebb8928504583da78a5173989fadfb1ac94be06a04f3cdbe9";

#[derive(Debug, Deserialize)]
struct GqlResponse {
    data: Option<GqlData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlData {
    stream_playback_access_token: Option<AccessToken>,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    value: String,
    signature: String,
}

/// The vendor's own playlist path: playback access token, then the usher playlist.
pub struct TwitchNative {
    fetcher: HttpPlaylistFetcher,
    headers: HeaderMap,
}

impl TwitchNative {
    pub fn new(fetcher: HttpPlaylistFetcher, config: &NativeConfig) -> Result<Self, PlaylistError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static(PLAYER_ORIGIN));
        headers.insert(header::ORIGIN, HeaderValue::from_static(PLAYER_ORIGIN));
        headers.insert(
            HeaderName::from_static("client-id"),
            header_value(&config.client_id)?,
        );
        headers.insert(
            HeaderName::from_static("device-id"),
            header_value(&Self::device_id())?,
        );
        if let Some(token) = &config.oauth_token {
            headers.insert(header::AUTHORIZATION, header_value(&format!("OAuth {token}"))?);
        }

        Ok(Self { fetcher, headers })
    }

    fn device_id() -> String {
        rand::rng()
            .random_range(1000000000000000i64..9999999999999999i64)
            .to_string()
    }

    fn access_token_query(channel: &str) -> serde_json::Value {
        serde_json::json!({
            "operationName": "PlaybackAccessToken",
            "extensions": {
                "persistedQuery": {
                    "version": 1,
                    "sha256Hash": PLAYBACK_ACCESS_TOKEN_HASH,
                }
            },
            "variables": {
                "isLive": true,
                "login": channel,
                "isVod": false,
                "vodID": "",
                "playerType": "site",
                "isClip": false,
                "clipID": "",
                "platform": "site",
            },
        })
    }

    async fn access_token(&self, channel: &str) -> Result<AccessToken, PlaylistError> {
        let response = self
            .fetcher
            .client()
            .post(GQL_API_URL)
            .headers(self.headers.clone())
            .json(&Self::access_token_query(channel))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaylistError::HttpStatus {
                status,
                url: GQL_API_URL.to_string(),
            });
        }

        let body = response.text().await?;
        debug!("access token response: {}", body);
        parse_access_token(&body)
    }

    fn usher_url(channel: &str, token: &AccessToken) -> Result<String, PlaylistError> {
        let epoch_seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            .to_string();

        let url = url::Url::parse_with_params(
            &format!("{USHER_URL}/{channel}.m3u8"),
            &[
                ("player", "twitchweb"),
                ("p", epoch_seconds.as_str()),
                ("type", "any"),
                ("allow_source", "true"),
                ("allow_audio_only", "true"),
                ("allow_spectre", "false"),
                ("fast_bread", "true"),
                ("token", token.value.as_str()),
                ("sig", token.signature.as_str()),
            ],
        )
        .map_err(|e| PlaylistError::InvalidUrl(e.to_string()))?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl NativeStreams for TwitchNative {
    async fn native_live_streams(&self, channel: &str) -> Result<VariantPlaylist, PlaylistError> {
        let token = self.access_token(channel).await?;
        let request = PlaylistRequest {
            url: Self::usher_url(channel, &token)?,
            headers: self.headers.clone(),
        };
        self.fetcher.fetch_variant_playlist(&request).await
    }
}

fn header_value(value: &str) -> Result<HeaderValue, PlaylistError> {
    HeaderValue::from_str(value).map_err(|e| PlaylistError::Validation(e.to_string()))
}

fn parse_access_token(body: &str) -> Result<AccessToken, PlaylistError> {
    let response: GqlResponse = serde_json::from_str(body)?;
    response
        .data
        .and_then(|d| d.stream_playback_access_token)
        .ok_or_else(|| {
            PlaylistError::Validation("Could not find streamPlaybackAccessToken".to_string())
        })
}
