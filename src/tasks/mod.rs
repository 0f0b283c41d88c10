//! Background Tasks Module
//!
//! Contains background tasks that run alongside the cache.
//!
//! # Tasks
//! - Expiry janitor: evicts idle entries every quarter of the expiry window

mod janitor;

pub(crate) use janitor::Janitor;
pub use janitor::sweep_period;
