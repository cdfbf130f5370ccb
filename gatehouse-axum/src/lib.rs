//! Axum bindings for the gatehouse account service
//!
//! One plain route table instead of handler objects: each path maps straight
//! to a handler function over [`AuthState`], and the error type translates
//! the core taxonomy into status codes. Mount the router under whatever
//! prefix the surrounding application uses.

pub mod error;
pub mod extractors;
pub mod routes;
pub mod types;

pub use error::ApiError;
pub use extractors::{AuthAccount, BearerToken};
pub use routes::{AuthState, create_router};
