pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod posts;
pub mod profile;
pub mod session;
pub mod state;
pub mod users;
pub mod validate;
