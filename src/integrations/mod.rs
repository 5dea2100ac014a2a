//! Integration with the repository backend

mod backend;
mod fetch;

pub use backend::{BackendClient, FetchError};
pub use fetch::{retry_with_backoff, FetchState, FetchTask};
