//! Fleetboard - microservice status dashboard engine
//!
//! Custom field sets, an expression filter grammar, multi-key sorting and
//! rollout status derivation, exposed through a JSON API.

pub mod api;
pub mod config;
pub mod db;
pub mod debounce;
pub mod deploy;
pub mod domain;
pub mod filter;
pub mod integrations;
pub mod session;
pub mod store;
