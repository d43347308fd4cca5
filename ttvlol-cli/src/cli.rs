use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "ttvlol",
    version,
    about = "Play Twitch live streams through ad-free playlist proxies"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Playlist proxy endpoints, tried in order. A bare base URL gets
    /// `/playlist/<channel>.m3u8`, otherwise `{channel}` is substituted.
    #[arg(long, global = true, value_delimiter = ',')]
    pub proxy_playlist: Vec<String>,

    /// Channels that never go through a playlist proxy.
    #[arg(long, global = true, value_delimiter = ',')]
    pub proxy_playlist_exclude: Vec<String>,

    /// Fall back to the native playlist when every proxy fails.
    #[arg(long, global = true)]
    pub proxy_playlist_fallback: bool,

    /// Use the TTV.LOL proxy instead of `--proxy-playlist`.
    #[arg(long, global = true)]
    pub ttvlol: bool,

    /// Drop advertisement segments.
    #[arg(long, global = true)]
    pub disable_ads: bool,

    /// Relaunch with the same arguments when an advertisement segment shows up.
    #[arg(long, global = true)]
    pub restart_on_ad: bool,

    /// Twitch OAuth token for the native playlist.
    #[arg(long, global = true, env = "TTVLOL_OAUTH_TOKEN", hide_env_values = true)]
    pub oauth_token: Option<String>,

    /// Configuration file (defaults to <config dir>/ttvlol/config.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// HTTP timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the variants of a live channel.
    Streams {
        channel: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Follow a live channel and print the segment URLs that pass the ad filter.
    Watch {
        channel: String,

        /// Variant name, or `best` / `worst`.
        #[arg(long, default_value = "best")]
        quality: String,

        /// Stop after this many playlist refreshes.
        #[arg(long)]
        max_refreshes: Option<u64>,
    },
}
