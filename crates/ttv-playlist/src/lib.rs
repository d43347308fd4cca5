//! Live Twitch playlist acquisition through third-party playlist proxies.
//!
//! [`PlaylistProxyResolver`] tries each configured proxy endpoint in order and
//! falls back to the vendor's own path ([`TwitchNative`]) where allowed.
//! [`AdSegmentPolicy`] decides, per segment, whether an advertisement is
//! played, dropped, or answered with a process relaunch.

pub mod ads;
pub mod client;
pub mod config;
pub mod error;
pub mod native;
pub mod playlist;
pub mod proxy;

pub use ads::{AdDetector, AdReaction, AdSegmentPolicy, ProcessRestarter, Restarter, Segment};
pub use client::default_client;
pub use config::{DEFAULT_PROXY, HttpConfig, NativeConfig, ProxyConfig, ReactionConfig};
pub use error::PlaylistError;
pub use native::TwitchNative;
pub use playlist::{
    HttpPlaylistFetcher, PlaylistFetcher, PlaylistRequest, StreamVariant, VariantPlaylist,
};
pub use proxy::{NativeStreams, PlaylistProxyResolver};
