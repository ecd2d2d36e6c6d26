//! Client-side session handling: a state machine over the auth endpoints
//! that keeps the current account in memory and the bearer token in a
//! pluggable store.

pub mod api;
pub mod manager;
pub mod store;

pub use api::{ClientError, HttpApi, SessionApi};
pub use manager::{SessionManager, SessionState};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
