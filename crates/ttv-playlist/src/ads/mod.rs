mod detector;
mod policy;

pub use detector::{AdDetector, PREFETCH_TITLE, Segment, normalize_prefetch_tags};
pub use policy::{AdReaction, AdSegmentPolicy, ProcessRestarter, Restarter};
