use std::collections::HashMap;

use m3u8_rs::{DateRange, MediaPlaylist, MediaSegment};
use tracing::debug;

/// `EXTINF` title given to segments rewritten from `#EXT-X-TWITCH-PREFETCH`.
pub const PREFETCH_TITLE: &str = "PREFETCH_SEGMENT";

const AD_CLASS: &str = "twitch-stitched-ad";
const AD_ID_PREFIX: &str = "stitched-ad-";

/// A media segment together with its advertisement marker.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub media: &'a MediaSegment,
    pub media_sequence: u64,
    pub is_advertisement: bool,
}

/// Half-open interval `[start_ms, end_ms)` in Unix milliseconds.
#[derive(Debug, Clone, Copy)]
struct AdWindow {
    start_ms: i64,
    end_ms: i64,
}

impl AdWindow {
    /// `None` for date ranges that are not stitched ads or have no known end.
    fn from_daterange(daterange: &DateRange) -> Option<Self> {
        if daterange.class.as_deref() != Some(AD_CLASS) && !daterange.id.starts_with(AD_ID_PREFIX)
        {
            return None;
        }

        let start_ms = daterange.start_date.timestamp_millis();
        // DURATION comes from the proxy; the float cast and the sum both saturate.
        let end_ms = match (daterange.end_date, daterange.duration) {
            (Some(end), _) => end.timestamp_millis(),
            (None, Some(duration)) => start_ms.saturating_add((duration * 1000.0) as i64),
            (None, None) => return None,
        };
        Some(Self { start_ms, end_ms })
    }

    fn contains(&self, ms: i64) -> bool {
        self.start_ms <= ms && ms < self.end_ms
    }
}

/// Tracks ad date ranges across refreshes of one media playlist and marks
/// the segments that fall inside them.
#[derive(Debug, Default)]
pub struct AdDetector {
    windows: HashMap<String, AdWindow>,
    pending_discontinuity: bool,
}

impl AdDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify<'a>(&mut self, playlist: &'a MediaPlaylist) -> Vec<Segment<'a>> {
        for daterange in playlist.segments.iter().filter_map(|s| s.daterange.as_ref()) {
            self.record(daterange);
        }

        if let Some(oldest_ms) = playlist
            .segments
            .iter()
            .filter_map(|s| s.program_date_time.map(|pdt| pdt.timestamp_millis()))
            .min()
        {
            self.windows.retain(|_, w| w.end_ms >= oldest_ms);
        }

        let mut media_sequence = playlist.media_sequence;
        let mut segments = Vec::with_capacity(playlist.segments.len());
        for media in &playlist.segments {
            segments.push(Segment {
                media,
                media_sequence,
                is_advertisement: self.is_ad(media),
            });
            media_sequence = media_sequence.saturating_add(1);
        }
        segments
    }

    fn record(&mut self, daterange: &DateRange) {
        let Some(window) = AdWindow::from_daterange(daterange) else {
            return;
        };
        if self.windows.insert(daterange.id.clone(), window).is_none() {
            debug!(id = %daterange.id, class = ?daterange.class, "New ad DATERANGE");
        }
    }

    fn is_ad(&mut self, media: &MediaSegment) -> bool {
        let title = media.title.as_deref().unwrap_or_default();

        // A prefetch segment right behind a discontinuity is the start of an ad break.
        let follows_discontinuity = self.pending_discontinuity && !media.discontinuity;
        self.pending_discontinuity = media.discontinuity;

        let in_window = media.program_date_time.is_some_and(|pdt| {
            let ms = pdt.timestamp_millis();
            self.windows.values().any(|w| w.contains(ms))
        });

        title.contains("Amazon")
            || in_window
            || (follows_discontinuity && title == PREFETCH_TITLE)
    }
}

/// Rewrites `#EXT-X-TWITCH-PREFETCH` tags into ordinary segments so the
/// playlist parses with `m3u8-rs`.
pub fn normalize_prefetch_tags(playlist_content: &str) -> String {
    let mut out = String::with_capacity(playlist_content.len());
    for line in playlist_content.lines() {
        if let Some(prefetch_uri) = line.strip_prefix("#EXT-X-TWITCH-PREFETCH:") {
            out.push_str("#EXTINF:2.002,");
            out.push_str(PREFETCH_TITLE);
            out.push('\n');
            out.push_str(prefetch_uri);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_media_playlist(input: &str) -> MediaPlaylist {
        match m3u8_rs::parse_playlist_res(input.as_bytes()).expect("playlist should parse") {
            m3u8_rs::Playlist::MediaPlaylist(pl) => pl,
            m3u8_rs::Playlist::MasterPlaylist(_) => panic!("expected media playlist"),
        }
    }

    fn flags(segments: &[Segment<'_>]) -> Vec<bool> {
        segments.iter().map(|s| s.is_advertisement).collect()
    }

    #[test]
    fn segments_inside_stitched_ad_daterange_are_ads() {
        let playlist = parse_media_playlist(
            "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:2\n#EXT-X-MEDIA-SEQUENCE:100\n\
#EXT-X-PROGRAM-DATE-TIME:2026-01-01T00:00:00.000Z\n#EXTINF:2.000,live\nseg100.ts\n\
#EXT-X-DATERANGE:ID=\"stitched-ad-1\",CLASS=\"twitch-stitched-ad\",\
START-DATE=\"2026-01-01T00:00:02.000Z\",END-DATE=\"2026-01-01T00:00:06.000Z\"\n\
#EXT-X-PROGRAM-DATE-TIME:2026-01-01T00:00:02.000Z\n#EXTINF:2.000,live\nseg101.ts\n\
#EXT-X-PROGRAM-DATE-TIME:2026-01-01T00:00:04.000Z\n#EXTINF:2.000,live\nseg102.ts\n\
#EXT-X-PROGRAM-DATE-TIME:2026-01-01T00:00:06.000Z\n#EXTINF:2.000,live\nseg103.ts\n",
        );

        let mut detector = AdDetector::new();
        let segments = detector.classify(&playlist);

        assert_eq!(flags(&segments), vec![false, true, true, false]);
        assert_eq!(segments[0].media_sequence, 100);
        assert_eq!(segments[3].media_sequence, 103);
    }

    #[test]
    fn ad_daterange_is_remembered_across_refreshes() {
        let first = parse_media_playlist(
            "#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXT-X-MEDIA-SEQUENCE:1\n\
#EXT-X-DATERANGE:ID=\"stitched-ad-7\",CLASS=\"twitch-stitched-ad\",\
START-DATE=\"2026-01-01T00:00:00.000Z\",DURATION=30.0\n\
#EXT-X-PROGRAM-DATE-TIME:2026-01-01T00:00:00.000Z\n#EXTINF:2.000,live\nseg1.ts\n",
        );
        let second = parse_media_playlist(
            "#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXT-X-MEDIA-SEQUENCE:2\n\
#EXT-X-PROGRAM-DATE-TIME:2026-01-01T00:00:02.000Z\n#EXTINF:2.000,live\nseg2.ts\n",
        );

        let mut detector = AdDetector::new();
        assert_eq!(flags(&detector.classify(&first)), vec![true]);
        assert_eq!(flags(&detector.classify(&second)), vec![true]);
    }

    #[test]
    fn amazon_titled_segments_are_ads() {
        let playlist = parse_media_playlist(
            "#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXT-X-MEDIA-SEQUENCE:1\n\
#EXTINF:2.000,Amazon|123456\nad.ts\n#EXTINF:2.000,live\nseg.ts\n",
        );
        let segments = AdDetector::new().classify(&playlist);
        assert_eq!(flags(&segments), vec![true, false]);
    }

    #[test]
    fn prefetch_after_discontinuity_is_an_ad() {
        let raw = "#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXT-X-MEDIA-SEQUENCE:1\n\
#EXTINF:2.000,live\nseg1.ts\n#EXT-X-DISCONTINUITY\n#EXTINF:2.000,live\nseg2.ts\n\
#EXT-X-TWITCH-PREFETCH:https://example.com/prefetch.ts\n";
        let playlist = parse_media_playlist(&normalize_prefetch_tags(raw));

        let segments = AdDetector::new().classify(&playlist);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].media.uri, "https://example.com/prefetch.ts");
        assert_eq!(flags(&segments), vec![false, false, true]);
    }

    #[test]
    fn normalize_prefetch_tags_rewrites_only_prefetch_lines() {
        let input = "#EXTM3U\n\
#EXT-X-DATERANGE:ID=\"stitched-ad-1\",CLASS=\"twitch-stitched-ad\",\
START-DATE=\"2026-01-01T00:00:02Z\",DURATION=4.0\n\
#EXT-X-TWITCH-PREFETCH:https://example.com/prefetch.ts\n";

        let out = normalize_prefetch_tags(input);

        assert!(out.contains("#EXT-X-DATERANGE:ID=\"stitched-ad-1\""));
        assert!(!out.contains("#EXT-X-TWITCH-PREFETCH:"));
        assert!(out.contains("#EXTINF:2.002,PREFETCH_SEGMENT\nhttps://example.com/prefetch.ts\n"));
    }

    #[test]
    fn huge_daterange_duration_still_marks_ads() {
        let playlist = parse_media_playlist(
            "#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXT-X-MEDIA-SEQUENCE:1\n\
#EXT-X-DATERANGE:ID=\"stitched-ad-9\",CLASS=\"twitch-stitched-ad\",\
START-DATE=\"2026-01-01T00:00:00.000Z\",DURATION=99999999999999999999\n\
#EXT-X-PROGRAM-DATE-TIME:2026-01-01T00:00:02.000Z\n#EXTINF:2.000,live\nseg1.ts\n",
        );

        let segments = AdDetector::new().classify(&playlist);

        assert_eq!(flags(&segments), vec![true]);
    }

    #[test]
    fn media_sequence_saturates_at_the_top() {
        let playlist = parse_media_playlist(&format!(
            "#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXT-X-MEDIA-SEQUENCE:{}\n\
#EXTINF:2.000,live\nseg1.ts\n#EXTINF:2.000,live\nseg2.ts\n",
            u64::MAX
        ));

        let segments = AdDetector::new().classify(&playlist);

        assert_eq!(segments[0].media_sequence, u64::MAX);
        assert_eq!(segments[1].media_sequence, u64::MAX);
    }
}
