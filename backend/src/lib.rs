//! # Exercise Tracker Backend
//!
//! A small REST service recording users and the exercises they log, with
//! date-range and count filtering over each user's history.
//!
//! ## Architecture
//!
//! - [`api`]: record types shared across layers (`RecordId`, `User`, `Exercise`)
//! - [`models`]: calendar-date parsing and rendering
//! - [`routes`]: per-endpoint request validation and response shapes
//! - [`db`]: repository traits, the in-memory and Postgres backends, the
//!   factory that selects one, and the service flows over them
//! - [`http`]: axum router, handlers and error mapping
//!
//! The repository is constructed once at startup and injected into the
//! router state; nothing in the crate is global.

// RepositoryError carries a full ErrorContext.
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod routes;

#[cfg(feature = "http-server")]
pub mod http;
