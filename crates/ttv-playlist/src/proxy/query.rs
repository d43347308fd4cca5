use url::form_urlencoded;

/// Playback parameters the vendor expects on a live playlist request.
pub const PLAYLIST_PARAMS: [(&str, &str); 6] = [
    ("player", "twitchweb"),
    ("type", "any"),
    ("allow_source", "true"),
    ("allow_audio_only", "true"),
    ("allow_spectre", "false"),
    ("fast_bread", "true"),
];

/// Appends [`PLAYLIST_PARAMS`] to `url` unless it already carries a query.
pub fn augment(url: &str) -> String {
    let base = match url.split_once('?') {
        Some((_, query)) if !query.is_empty() => return url.to_string(),
        Some((base, _)) => base,
        None => url,
    };

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(PLAYLIST_PARAMS)
        .finish();
    format!("{base}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_QUERY: &str = "player=twitchweb&type=any&allow_source=true\
                                  &allow_audio_only=true&allow_spectre=false&fast_bread=true";

    #[test]
    fn appends_params_in_order() {
        assert_eq!(
            augment("https://proxy.example/playlist/foo.m3u8"),
            format!("https://proxy.example/playlist/foo.m3u8?{EXPECTED_QUERY}")
        );
    }

    #[test]
    fn leaves_existing_query_alone() {
        let url = "https://proxy.example/playlist/foo.m3u8?token=abc";
        assert_eq!(augment(url), url);
    }

    #[test]
    fn empty_query_is_filled() {
        assert_eq!(
            augment("https://proxy.example/a.m3u8?"),
            format!("https://proxy.example/a.m3u8?{EXPECTED_QUERY}")
        );
    }
}
