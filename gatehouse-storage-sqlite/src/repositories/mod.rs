//! Repository implementations for SQLite storage

pub mod account;
pub mod token;

pub use account::SqliteAccountRepository;
pub use token::SqliteVerificationTokenRepository;
