pub mod query;
mod resolver;
pub mod template;

pub use resolver::{NativeStreams, PLAYER_ORIGIN, PlaylistProxyResolver};
pub use template::{CHANNEL_PLACEHOLDER, ResolvedEndpoint};
