//! Request DTOs for the object cache API
//!
//! Defines the structure of incoming query parameters.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Query parameters for reading an object (GET /objects/:key)
///
/// # Fields
/// - `since`: RFC 3339 time of the newest write the caller knows about.
///   Entries last accessed before it are treated as stale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenQuery {
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}
