use std::time::Duration;

use m3u8_rs::{MediaPlaylist, Playlist};
use reqwest::Client;
#[cfg(feature = "table-output")]
use tabled::{Table, Tabled, settings::Style};
use tracing::{debug, info};
use ttv_playlist::ads::normalize_prefetch_tags;
use ttv_playlist::{
    AdDetector, AdSegmentPolicy, HttpPlaylistFetcher, PlaylistProxyResolver, Restarter,
    StreamVariant, TwitchNative, VariantPlaylist, default_client,
};
use url::Url;

use crate::config::AppConfig;
use crate::error::{AppError, Result};

const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(500);

pub struct CommandExecutor<R> {
    client: Client,
    resolver: PlaylistProxyResolver<HttpPlaylistFetcher, TwitchNative>,
    policy: AdSegmentPolicy<R>,
}

impl<R: Restarter> CommandExecutor<R> {
    pub fn new(config: AppConfig, restarter: R) -> Result<Self> {
        let client = default_client(&config.http)?;
        let fetcher = HttpPlaylistFetcher::new(client.clone());
        let native = TwitchNative::new(fetcher.clone(), &config.native)?;

        Ok(Self {
            client,
            resolver: PlaylistProxyResolver::new(config.proxy, fetcher, native),
            policy: AdSegmentPolicy::new(config.ads, restarter),
        })
    }

    pub async fn streams(&self, channel: &str, json: bool) -> Result<()> {
        let playlist = self.resolver.streams(channel).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&playlist)?);
        } else {
            println!("{}", format_variants(&playlist));
        }
        Ok(())
    }

    pub async fn watch(
        &self,
        channel: &str,
        quality: &str,
        max_refreshes: Option<u64>,
    ) -> Result<()> {
        let playlist = self.resolver.streams(channel).await?;
        let variant = select_variant(&playlist, quality)?;
        info!(channel, variant = %variant.name, "Following media playlist");

        let base_url =
            Url::parse(&variant.url).map_err(|e| AppError::ParseError(e.to_string()))?;
        let mut detector = AdDetector::new();
        let mut next_msn: Option<u64> = None;
        let mut refreshes = 0u64;

        loop {
            let media = self.fetch_media_playlist(&variant.url).await?;

            for segment in detector.classify(&media) {
                if next_msn.is_some_and(|next| segment.media_sequence < next) {
                    continue;
                }
                next_msn = Some(segment.media_sequence.saturating_add(1));

                if self.policy.should_filter(&segment) {
                    continue;
                }
                match base_url.join(&segment.media.uri) {
                    Ok(url) => println!("{url}"),
                    Err(e) => {
                        let uri = &segment.media.uri;
                        debug!(uri = %uri, error = %e, "Skipping unresolvable segment")
                    }
                }
            }

            if media.end_list {
                info!(channel, "Stream ended");
                return Ok(());
            }

            refreshes += 1;
            if max_refreshes.is_some_and(|max| refreshes >= max) {
                return Ok(());
            }

            let interval = Duration::from_secs_f64(media.target_duration as f64 * 0.5)
                .max(MIN_REFRESH_INTERVAL);
            tokio::time::sleep(interval).await;
        }
    }

    async fn fetch_media_playlist(&self, url: &str) -> Result<MediaPlaylist> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_media_playlist(&body)
    }
}

fn parse_media_playlist(body: &str) -> Result<MediaPlaylist> {
    let normalized = normalize_prefetch_tags(body);
    match m3u8_rs::parse_playlist_res(normalized.as_bytes()) {
        Ok(Playlist::MediaPlaylist(media)) => Ok(media),
        Ok(Playlist::MasterPlaylist(_)) => Err(AppError::ParseError(
            "expected a media playlist, got a master playlist".to_string(),
        )),
        Err(e) => Err(AppError::ParseError(e.to_string())),
    }
}

fn select_variant<'a>(playlist: &'a VariantPlaylist, quality: &str) -> Result<&'a StreamVariant> {
    playlist
        .select(quality)
        .ok_or_else(|| AppError::QualityNotFound {
            quality: quality.to_string(),
            available: playlist
                .variants
                .iter()
                .map(|v| v.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

#[cfg(feature = "table-output")]
fn format_variants(playlist: &VariantPlaylist) -> String {
    #[derive(Tabled)]
    struct VariantRow<'a> {
        #[tabled(rename = "Quality")]
        name: &'a str,
        #[tabled(rename = "Bandwidth")]
        bandwidth: u64,
        #[tabled(rename = "Resolution")]
        resolution: &'a str,
        #[tabled(rename = "URL")]
        url: &'a str,
    }

    let rows = playlist.variants.iter().map(|variant| VariantRow {
        name: &variant.name,
        bandwidth: variant.bandwidth,
        resolution: variant.resolution.as_deref().unwrap_or("-"),
        url: &variant.url,
    });
    Table::new(rows).with(Style::modern()).to_string()
}

#[cfg(not(feature = "table-output"))]
fn format_variants(playlist: &VariantPlaylist) -> String {
    playlist
        .variants
        .iter()
        .map(|variant| format!("{}\t{}", variant.name, variant.url))
        .collect::<Vec<_>>()
        .join("\n")
}
