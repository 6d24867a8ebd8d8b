//! Type definitions for HTTP runtime
//!
//! Request and response bodies of the diagnosis API.

pub mod requests;
pub mod responses;

// Re-export all types for convenience
pub use requests::*;
pub use responses::*;
