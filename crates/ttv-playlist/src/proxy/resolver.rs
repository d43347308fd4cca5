use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, info};

use super::template::{self, DONATION_HEADER, DONATION_URL};
use crate::config::ProxyConfig;
use crate::error::PlaylistError;
use crate::playlist::{PlaylistFetcher, PlaylistRequest, VariantPlaylist};

/// Origin the vendor's CDN and the proxies expect on playlist requests.
pub const PLAYER_ORIGIN: &str = "https://player.twitch.tv";

/// The vendor's own live playlist path.
#[async_trait]
pub trait NativeStreams: Send + Sync {
    async fn native_live_streams(&self, channel: &str) -> Result<VariantPlaylist, PlaylistError>;
}

/// Obtains a live variant playlist through the configured playlist proxies,
/// falling back to the native path where allowed.
pub struct PlaylistProxyResolver<F, N> {
    config: ProxyConfig,
    fetcher: F,
    native: N,
}

impl<F, N> PlaylistProxyResolver<F, N>
where
    F: PlaylistFetcher,
    N: NativeStreams,
{
    pub fn new(config: ProxyConfig, fetcher: F, native: N) -> Self {
        Self {
            config,
            fetcher,
            native,
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    /// Builds the request for one endpoint template.
    pub fn request_for(template: &str, channel: &str) -> PlaylistRequest {
        let resolved = template::resolve(template, channel);

        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static(PLAYER_ORIGIN));
        headers.insert(header::ORIGIN, HeaderValue::from_static(PLAYER_ORIGIN));
        if resolved.uses_donation_header {
            headers.insert(
                HeaderName::from_static(DONATION_HEADER),
                HeaderValue::from_static(DONATION_URL),
            );
        }

        PlaylistRequest {
            url: resolved.url,
            headers,
        }
    }

    pub async fn streams(&self, channel: &str) -> Result<VariantPlaylist, PlaylistError> {
        if self.config.is_excluded(channel) {
            info!(channel, "Channel is excluded from playlist proxies, using native playlist");
            return self.native.native_live_streams(channel).await;
        }

        let endpoints = self.config.endpoints();
        if endpoints.is_empty() {
            debug!(channel, "No playlist proxies configured");
            return self.native.native_live_streams(channel).await;
        }

        for template in endpoints.iter() {
            let request = Self::request_for(template, channel);
            debug!(channel, endpoint = %request.url, "Trying playlist proxy");

            match self.fetcher.fetch_variant_playlist(&request).await {
                Ok(playlist) => {
                    info!(channel, endpoint = %request.url, "Using playlist proxy");
                    return Ok(playlist);
                }
                Err(e) => {
                    error!(channel, endpoint = %request.url, error = %e, "Playlist proxy failed");
                }
            }
        }

        if self.config.fallback_on_fail {
            info!(channel, "All playlist proxies failed, falling back to native playlist");
            return self.native.native_live_streams(channel).await;
        }

        Err(PlaylistError::NoStreamsAvailable {
            channel: channel.to_string(),
        })
    }
}
