use std::io;

use process_utils::LaunchArgs;
use tracing::{error, warn};

use super::detector::Segment;
use crate::config::ReactionConfig;

/// What to do with one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdReaction {
    Keep,
    Drop,
    Restart,
}

/// Starts the process over. Never returns.
pub trait Restarter: Send + Sync {
    fn restart(&self) -> !;
}

/// Relaunches the current executable with its original arguments, then exits.
#[derive(Debug, Clone)]
pub struct ProcessRestarter {
    launch: LaunchArgs,
}

impl ProcessRestarter {
    /// Captures the launch arguments. Call this at start-up.
    pub fn from_current_process() -> io::Result<Self> {
        Ok(Self {
            launch: LaunchArgs::current()?,
        })
    }

    pub fn new(launch: LaunchArgs) -> Self {
        Self { launch }
    }
}

impl Restarter for ProcessRestarter {
    fn restart(&self) -> ! {
        warn!(
            program = %self.launch.program.display(),
            "Relaunching to acquire a fresh playlist"
        );
        match process_utils::relaunch(&self.launch) {
            Ok(never) => match never {},
            Err(e) => {
                error!(error = %e, "Failed to relaunch process");
                std::process::exit(1)
            }
        }
    }
}

/// Segment filter that drops ad segments or restarts the process on them.
pub struct AdSegmentPolicy<R> {
    config: ReactionConfig,
    restarter: R,
}

impl<R: Restarter> AdSegmentPolicy<R> {
    pub fn new(config: ReactionConfig, restarter: R) -> Self {
        Self { config, restarter }
    }

    pub fn config(&self) -> ReactionConfig {
        self.config
    }

    /// Restart is checked before drop.
    pub fn react(&self, segment: &Segment<'_>) -> AdReaction {
        if !segment.is_advertisement {
            return AdReaction::Keep;
        }
        if self.config.restart_on_ad {
            AdReaction::Restart
        } else if self.config.drop_ads {
            AdReaction::Drop
        } else {
            AdReaction::Keep
        }
    }

    /// Returns `true` when the segment must be dropped. Restarts the process
    /// instead of returning when `restart_on_ad` is set and the segment is an ad.
    pub fn should_filter(&self, segment: &Segment<'_>) -> bool {
        match self.react(segment) {
            AdReaction::Keep => false,
            AdReaction::Drop => {
                let uri = &segment.media.uri;
                warn!(msn = segment.media_sequence, uri = %uri, "Filtering out ad segment");
                true
            }
            AdReaction::Restart => {
                let uri = &segment.media.uri;
                warn!(msn = segment.media_sequence, uri = %uri, "Ad segment detected");
                self.restarter.restart()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use m3u8_rs::MediaSegment;

    use super::*;

    struct PanicRestarter;

    impl Restarter for PanicRestarter {
        fn restart(&self) -> ! {
            panic!("restart requested")
        }
    }

    fn policy(drop_ads: bool, restart_on_ad: bool) -> AdSegmentPolicy<PanicRestarter> {
        AdSegmentPolicy::new(
            ReactionConfig {
                drop_ads,
                restart_on_ad,
            },
            PanicRestarter,
        )
    }

    fn segment(media: &MediaSegment, is_advertisement: bool) -> Segment<'_> {
        Segment {
            media,
            media_sequence: 42,
            is_advertisement,
        }
    }

    #[test]
    fn ads_play_through_by_default() {
        let media = MediaSegment::default();
        let policy = policy(false, false);
        assert_eq!(policy.react(&segment(&media, true)), AdReaction::Keep);
        assert!(!policy.should_filter(&segment(&media, true)));
    }

    #[test]
    fn drop_ads_filters_only_ad_segments() {
        let media = MediaSegment::default();
        let policy = policy(true, false);
        assert!(policy.should_filter(&segment(&media, true)));
        assert!(!policy.should_filter(&segment(&media, false)));
    }

    #[test]
    fn restart_supersedes_drop() {
        let media = MediaSegment::default();
        let policy = policy(true, true);
        assert_eq!(policy.react(&segment(&media, true)), AdReaction::Restart);
        assert_eq!(policy.react(&segment(&media, false)), AdReaction::Keep);
    }

    #[test]
    fn regular_segments_never_restart() {
        let media = MediaSegment::default();
        assert!(!policy(false, true).should_filter(&segment(&media, false)));
    }

    #[test]
    #[should_panic(expected = "restart requested")]
    fn ad_segment_with_restart_triggers_restarter() {
        let media = MediaSegment::default();
        policy(true, true).should_filter(&segment(&media, true));
    }
}
