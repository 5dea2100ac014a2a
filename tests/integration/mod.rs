//! Integration tests for Fleetboard
//!
//! Each test runs the API against an in-process stub of the repository
//! backend bound to an ephemeral port.

mod api;
mod backend;
mod common;
mod storage;
