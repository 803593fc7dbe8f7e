//! OrbSync synchronization engine.
//!
//! The freshness-gated path between dashboard consumers and the
//! rate-limited upstream provider. Reads are always served from the cache;
//! upstream fetches happen only inside a policy's eligibility window, at
//! most one in flight per `(dataset, scope)`.
//!
//! The compliance invariant lives in [`eligibility::next_eligible`]: a pure
//! function of `(last_synced_at, policy)`, kept free of I/O so it can be
//! property-tested exhaustively.

pub mod eligibility;
pub mod mediator;
pub mod orchestrator;
pub mod registry;

pub use eligibility::{freshness_meta, next_eligible};
pub use mediator::{ReadMediator, TrajectoryRead};
pub use orchestrator::SyncOrchestrator;
pub use registry::PolicyRegistry;
