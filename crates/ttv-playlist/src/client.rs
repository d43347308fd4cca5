use std::sync::Arc;

use reqwest::Client;
use rustls::{ClientConfig, crypto::aws_lc_rs};
use rustls_platform_verifier::BuilderVerifierExt;

use crate::config::HttpConfig;
use crate::error::PlaylistError;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Builds the HTTP client shared by the proxy and native paths.
pub fn default_client(config: &HttpConfig) -> Result<Client, PlaylistError> {
    let provider = Arc::new(aws_lc_rs::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_platform_verifier()?
        .with_no_client_auth();

    Ok(Client::builder()
        .use_preconfigured_tls(tls_config)
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .build()?)
}
