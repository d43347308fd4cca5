use super::query;

/// Token replaced by the channel name in a proxy template.
pub const CHANNEL_PLACEHOLDER: &str = "{channel}";

/// Header some proxies expect, pointing at their donation page.
pub const DONATION_HEADER: &str = "x-donate-to";
pub const DONATION_URL: &str = "https://ttv.lol/donate";

/// A proxy template turned into a concrete request for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub url: String,
    pub uses_donation_header: bool,
}

/// Expands `template` for `channel`.
///
/// Templates containing [`CHANNEL_PLACEHOLDER`] are used verbatim after
/// substitution. Bare base URLs get `/playlist/<channel>.m3u8` plus the
/// vendor query, and the whole thing is percent-escaped except for `:` and `/`.
pub fn resolve(template: &str, channel: &str) -> ResolvedEndpoint {
    if template.contains(CHANNEL_PLACEHOLDER) {
        return ResolvedEndpoint {
            url: template.replace(CHANNEL_PLACEHOLDER, channel),
            uses_donation_header: false,
        };
    }

    let url = query::augment(&format!("{template}/playlist/{channel}.m3u8"));
    ResolvedEndpoint {
        url: escape(&url),
        uses_donation_header: true,
    }
}

// Keeps ASCII alphanumerics, `-_.~`, `:` and `/`.
fn escape(url: &str) -> String {
    urlencoding::encode(url)
        .replace("%3A", ":")
        .replace("%2F", "/")
}
