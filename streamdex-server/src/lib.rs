//! # streamdex server
//!
//! HTTP surface over the `streamdex-core` pipeline: catalog pages, per-title
//! meta objects, the provider list and cached poster files.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod presentation;
pub mod routes;

pub use infra::app_state::AppState;
