//! OrbSync upstream provider boundary.
//!
//! Outbound requests to the space-object-tracking data provider. Each
//! dataset type maps to an ordered list of candidate query endpoints; the
//! client tries them in order until one succeeds or all are exhausted.
//! Credential acquisition is session-based and handled inside the client;
//! callers only see record sets or `ProviderError`.

pub mod spacetrack;
pub mod traits;

pub use spacetrack::{SpaceTrackClient, SpaceTrackCredentials};
pub use traits::UpstreamProvider;
