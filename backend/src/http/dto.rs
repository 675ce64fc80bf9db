//! Query strings and small responses that exist only at the HTTP boundary.
//!
//! Request bodies and resource views live in [`crate::api`].

use serde::{Deserialize, Serialize};

use crate::services::MeetupWhen;

/// `?page=N` on paginated lists.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<usize>,
}

/// Query parameters for the meetup list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MeetupQuery {
    #[serde(default)]
    pub page: Option<usize>,
    /// `past` or `upcoming`; both when omitted.
    #[serde(default)]
    pub when: Option<MeetupWhen>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}
