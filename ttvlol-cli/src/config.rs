use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ttv_playlist::{HttpConfig, NativeConfig, ProxyConfig, ReactionConfig};

use crate::cli::Args;
use crate::error::{AppError, Result};

/// Everything read from the config file, before command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub proxy: ProxyConfig,
    pub ads: ReactionConfig,
    pub native: NativeConfig,
    pub http: HttpConfig,
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ttvlol").join("config.toml"))
    }

    /// Loads `path`, or the default location when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(AppError::ConfigNotFound(path));
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Applies command-line flags on top of the file configuration.
    pub fn apply_args(&mut self, args: &Args) {
        self.proxy.merge(ProxyConfig::from_option_lists(
            &args.proxy_playlist,
            &args.proxy_playlist_exclude,
            args.proxy_playlist_fallback,
            args.ttvlol,
        ));
        self.ads.merge(ReactionConfig {
            drop_ads: args.disable_ads,
            restart_on_ad: args.restart_on_ad,
        });
        if let Some(token) = &args.oauth_token {
            self.native.oauth_token = Some(token.clone());
        }
        if let Some(timeout) = args.timeout {
            self.http.timeout = Duration::from_secs(timeout);
        }
    }
}
