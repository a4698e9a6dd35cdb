mod client_config;
mod client_session;
mod engine;

pub use client_config::*;
pub use client_session::*;
