//! OrbSync Orbit - Propagation and Anomaly Detection
//!
//! Pure, stateless numerics on top of the core types: an orbital-element
//! propagator producing trajectory samples, geodetic conversion, summary
//! metrics, and a z-score anomaly detector. Nothing here touches the cache
//! or the network, so everything is trivially parallelizable across objects.

pub mod detect;
pub mod geo;
pub mod metrics;
pub mod propagate;

pub use detect::{detect, detect_windowed};
pub use geo::{geodetic_of, GeodeticPoint};
pub use metrics::trajectory_metrics;
pub use propagate::{propagate, propagate_all, Propagation};
