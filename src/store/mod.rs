//! Field-set store

mod reducer;

pub use reducer::*;
