//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers translate requests into driving-port calls on [`state::HttpState`]
//! and map domain errors to responses in [`error`].

pub mod cache_control;
pub mod error;
pub mod health;
pub mod messages;
pub mod password;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod users;
pub mod validation;
