pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod pkce;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{TokenPair, TokenStore};
