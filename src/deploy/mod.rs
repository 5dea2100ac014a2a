//! Deployment status derivation for the service detail view

mod status;
mod table;

pub use status::*;
pub use table::*;
