//! Filtering and sorting of dashboard records

mod compare;
mod conditions;
mod pipeline;
mod resolver;

pub use compare::*;
pub use conditions::*;
pub use pipeline::*;
pub use resolver::*;
