/// Health-checking engine
///
/// This module owns the concurrent parts of the service:
/// - the status cache shared with the HTTP layer
/// - one bounded HTTP probe per enabled target, fanned out per cycle
/// - the scheduler loop that re-reads the target list and repeats
pub mod cache;
pub mod checker;
pub mod prober;
pub mod scheduler;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use cache::StatusCache;
pub use checker::{Checker, HttpChecker};
pub use prober::Prober;
pub use scheduler::Scheduler;
pub use types::TargetStatus;
