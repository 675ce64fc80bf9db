//! # ELSYSER backend
//!
//! REST backend for a school: accounts with token authentication, classes and
//! subjects, grades, exams, homeworks with student submissions, study
//! materials, class news with comments, and meetup talks with voting.
//!
//! ## Architecture
//!
//! - [`api`]: request payloads and response views crossing the HTTP boundary
//! - [`models`]: domain entities and their newtype ids
//! - [`db`]: repository traits, in-memory and PostgreSQL backends, factory
//! - [`services`]: permission checks and business rules per operation
//! - [`config`]: runtime settings from the environment
//! - [`http`]: axum router, extractors and handlers (feature `http-server`)

// RepositoryError carries rich context; boxing it buys nothing here.
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
