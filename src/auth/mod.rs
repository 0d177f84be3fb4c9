//! Credential store, password hashing, reset tickets, and session tokens.

pub mod error;
pub mod password;
pub mod session;
pub mod store;
pub mod ticket;
pub mod token;

pub use error::AuthError;
pub use session::Session;
pub use token::{Claims, TokenIssuer};
