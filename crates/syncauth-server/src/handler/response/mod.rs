//! Response types for HTTP handlers.

mod errors;
mod tokens;
mod verification;

pub use errors::ErrorResponse;
pub use tokens::{AccessTokenResponse, TokenPairResponse, ValidateTokenResponse};
pub use verification::{CODE_SENT, ConfirmCodeResponse, VerifyEmailResponse};
