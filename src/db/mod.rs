//! Database module - SQLite with sqlx

mod kv;
mod pool;

pub use kv::*;
pub use pool::*;
