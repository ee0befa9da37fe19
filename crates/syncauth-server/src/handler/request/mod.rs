//! Request types for HTTP handlers.

mod authentication;
mod tokens;
mod verification;

pub use authentication::*;
pub use tokens::*;
pub use verification::*;
