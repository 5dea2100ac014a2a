//! Domain models for Fleetboard

mod deployment;
mod fields;
mod record;

pub use deployment::*;
pub use fields::*;
pub use record::*;
