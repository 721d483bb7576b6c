//! Core session lifecycle for phone-number-based authentication (PNBA) on
//! Telegram.
//!
//! This crate is intentionally provider-agnostic. The Telegram network client
//! lives behind the [`gateway::ProviderGateway`] port implemented in the
//! `pnba-telegram` adapter crate; session persistence sits behind the
//! [`store::SessionStore`] port.
//!
//! Every operation is a short-lived future with no background tasks or hidden
//! retries: waits (flood control) are returned as data, and the calling layer
//! cancels or times out by dropping the future.

pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod logging;
pub mod messaging;
pub mod pending;
pub mod phone;
pub mod store;

#[cfg(test)]
pub(crate) mod testkit;

pub use errors::{Error, Result};
