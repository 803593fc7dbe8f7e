//! Space-Track client implementation.

pub mod client;
pub mod query;

pub use client::{SpaceTrackClient, SpaceTrackCredentials};
pub use query::candidate_queries;
