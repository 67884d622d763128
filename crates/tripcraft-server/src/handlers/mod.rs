//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod budget;
pub mod expense;
pub mod intent;
pub mod plan;
pub mod speech;

// Re-export all handlers for use in router
pub use budget::*;
pub use expense::*;
pub use intent::*;
pub use plan::*;
pub use speech::*;
