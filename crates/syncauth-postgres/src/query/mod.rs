//! Database query repositories.

mod user;

pub use user::UserRepository;
