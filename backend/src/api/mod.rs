//! Public API surface for the backend.
//!
//! This module consolidates the types that cross the HTTP boundary:
//! request payloads (validated with `validator`) and the response views
//! that the service layer renders from domain entities. All types derive
//! Serialize/Deserialize for JSON serialization.

pub mod requests;
pub mod views;

pub use requests::*;
pub use views::*;
