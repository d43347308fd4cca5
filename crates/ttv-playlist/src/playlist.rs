use async_trait::async_trait;
use m3u8_rs::{MasterPlaylist, Playlist};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::PlaylistError;

/// Top-level manifest of a live stream: one entry per quality rendition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantPlaylist {
    pub url: String,
    pub variants: Vec<StreamVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamVariant {
    pub name: String,
    pub url: String,
    pub bandwidth: u64,
    pub resolution: Option<String>,
    pub codecs: Option<String>,
    pub frame_rate: Option<f64>,
}

impl VariantPlaylist {
    /// Picks a variant by name. `best` and `worst` go by bandwidth.
    pub fn select(&self, quality: &str) -> Option<&StreamVariant> {
        match quality {
            "best" => self.variants.iter().max_by_key(|v| v.bandwidth),
            "worst" => self.variants.iter().min_by_key(|v| v.bandwidth),
            name => self
                .variants
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(name)),
        }
    }
}

/// A single playlist request. Headers belong to this request only.
#[derive(Debug, Clone)]
pub struct PlaylistRequest {
    pub url: String,
    pub headers: HeaderMap,
}

/// Fetches and parses a variant playlist.
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    async fn fetch_variant_playlist(
        &self,
        request: &PlaylistRequest,
    ) -> Result<VariantPlaylist, PlaylistError>;
}

/// [`PlaylistFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpPlaylistFetcher {
    client: Client,
}

impl HttpPlaylistFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch_variant_playlist(
        &self,
        request: &PlaylistRequest,
    ) -> Result<VariantPlaylist, PlaylistError> {
        debug!(url = %request.url, "Fetching variant playlist");
        let response = self
            .client
            .get(&request.url)
            .headers(request.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaylistError::HttpStatus {
                status,
                url: request.url.clone(),
            });
        }

        let body = response.bytes().await?;
        parse_variant_playlist(&body, &request.url)
    }
}

/// Parses playlist bytes fetched from `playlist_url`.
///
/// A media playlist is reported as a single `source` variant pointing back at
/// `playlist_url`.
pub fn parse_variant_playlist(
    body: &[u8],
    playlist_url: &str,
) -> Result<VariantPlaylist, PlaylistError> {
    let base_url =
        Url::parse(playlist_url).map_err(|e| PlaylistError::InvalidUrl(e.to_string()))?;
    let playlist = m3u8_rs::parse_playlist_res(body)
        .map_err(|e| PlaylistError::Playlist(e.to_string()))?;

    let variants = match playlist {
        Playlist::MasterPlaylist(pl) => process_master_playlist(pl, &base_url)?,
        Playlist::MediaPlaylist(_) => vec![StreamVariant {
            name: "source".to_string(),
            url: playlist_url.to_string(),
            bandwidth: 0,
            resolution: None,
            codecs: None,
            frame_rate: None,
        }],
    };

    Ok(VariantPlaylist {
        url: playlist_url.to_string(),
        variants,
    })
}

fn process_master_playlist(
    playlist: MasterPlaylist,
    base_url: &Url,
) -> Result<Vec<StreamVariant>, PlaylistError> {
    let MasterPlaylist {
        variants,
        alternatives,
        ..
    } = playlist;

    variants
        .into_iter()
        .filter(|variant| !variant.is_i_frame)
        .map(|variant| -> Result<StreamVariant, PlaylistError> {
            let url = base_url
                .join(&variant.uri)
                .map_err(|e| PlaylistError::InvalidUrl(format!("{}: {e}", variant.uri)))?;
            let resolution = variant
                .resolution
                .map(|r| format!("{}x{}", r.width, r.height));

            // Twitch names renditions through the EXT-X-MEDIA group the variant points at.
            let name = variant
                .video
                .as_deref()
                .and_then(|group| alternatives.iter().find(|alt| alt.group_id == group))
                .map(|alt| alt.name.clone())
                .or_else(|| resolution.clone())
                .unwrap_or_else(|| "source".to_string());

            Ok(StreamVariant {
                name,
                url: url.to_string(),
                bandwidth: variant.bandwidth,
                resolution,
                codecs: variant.codecs,
                frame_rate: variant.frame_rate,
            })
        })
        .collect()
}
