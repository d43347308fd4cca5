use std::borrow::Cow;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Well-known public playlist proxy used by `use_default_proxy`.
pub const DEFAULT_PROXY: &str = "https://api.ttv.lol";

/// Playlist proxy settings.
///
/// Endpoints are tried in the order they are listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy endpoint templates, either a bare base URL or a URL containing `{channel}`.
    pub playlist_proxies: Vec<String>,
    /// Channels that always use the native path. Matched case-insensitively.
    pub exclude: Vec<String>,
    /// Fall back to the native path once every endpoint has failed.
    pub fallback_on_fail: bool,
    /// Replace `playlist_proxies` with [`DEFAULT_PROXY`].
    pub use_default_proxy: bool,
}

impl ProxyConfig {
    /// Builds a config from comma separated option values, e.g. as taken from
    /// the command line. Blank entries are dropped and order is kept.
    pub fn from_option_lists<P, E>(
        proxies: P,
        exclude: E,
        fallback_on_fail: bool,
        use_default_proxy: bool,
    ) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            playlist_proxies: split_list(proxies),
            exclude: split_list(exclude),
            fallback_on_fail,
            use_default_proxy,
        }
    }

    /// The endpoint templates in the order they must be tried.
    pub fn endpoints(&self) -> Cow<'_, [String]> {
        if self.use_default_proxy {
            Cow::Owned(vec![DEFAULT_PROXY.to_string()])
        } else {
            Cow::Borrowed(&self.playlist_proxies)
        }
    }

    pub fn is_excluded(&self, channel: &str) -> bool {
        let channel = channel.to_lowercase();
        self.exclude.iter().any(|c| c.to_lowercase() == channel)
    }

    /// Merges another config on top of this one. Lists are appended and flags
    /// are only ever switched on.
    pub fn merge(&mut self, other: ProxyConfig) {
        self.playlist_proxies.extend(other.playlist_proxies);
        self.exclude.extend(other.exclude);
        self.fallback_on_fail |= other.fallback_on_fail;
        self.use_default_proxy |= other.use_default_proxy;
    }
}

/// How the segment filter reacts to advertisement segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    /// Drop ad segments from playback.
    pub drop_ads: bool,
    /// Relaunch the process as soon as an ad segment shows up.
    pub restart_on_ad: bool,
}

impl ReactionConfig {
    pub fn merge(&mut self, other: ReactionConfig) {
        self.drop_ads |= other.drop_ads;
        self.restart_on_ad |= other.restart_on_ad;
    }
}

/// Settings for the vendor's own playlist path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeConfig {
    pub client_id: String,
    pub oauth_token: Option<String>,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            client_id: "kimne78kx3ncx6brgo4mv6wki5h1ko".to_string(),
            oauth_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: crate::client::DEFAULT_UA.to_string(),
        }
    }
}

fn split_list<I>(values: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|v| {
            v.as_ref()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_proxy_replaces_configured_endpoints() {
        let config = ProxyConfig {
            playlist_proxies: vec!["https://a.example".into(), "https://b.example".into()],
            use_default_proxy: true,
            ..Default::default()
        };
        assert_eq!(config.endpoints().as_ref(), ["https://api.ttv.lol".to_string()]);
    }

    #[test]
    fn option_lists_keep_order_and_drop_blanks() {
        let config = ProxyConfig::from_option_lists(
            ["https://b.example, https://a.example", " ,https://c.example/{channel}"],
            ["Foo,,bar"],
            true,
            false,
        );
        assert_eq!(
            config.endpoints().as_ref(),
            [
                "https://b.example".to_string(),
                "https://a.example".to_string(),
                "https://c.example/{channel}".to_string(),
            ]
        );
        assert_eq!(config.exclude, vec!["Foo".to_string(), "bar".to_string()]);
        assert!(config.fallback_on_fail);
    }

    #[test]
    fn exclusion_is_case_insensitive() {
        let config =
            ProxyConfig::from_option_lists(Vec::<&str>::new(), ["SomeStreamer"], false, false);
        assert!(config.is_excluded("somestreamer"));
        assert!(config.is_excluded("SOMESTREAMER"));
        assert!(!config.is_excluded("otherstreamer"));
    }

    #[test]
    fn merge_only_enables_flags() {
        let mut ads = ReactionConfig {
            drop_ads: true,
            restart_on_ad: false,
        };
        ads.merge(ReactionConfig::default());
        assert!(ads.drop_ads);
        assert!(!ads.restart_on_ad);

        let mut proxy = ProxyConfig::from_option_lists(["https://a.example"], ["x"], false, false);
        proxy.merge(ProxyConfig::from_option_lists(["https://b.example"], ["y"], true, false));
        assert_eq!(proxy.playlist_proxies.len(), 2);
        assert_eq!(proxy.playlist_proxies[1], "https://b.example");
        assert!(proxy.fallback_on_fail);
    }
}
