mod config;
mod registry;
mod relay;
mod server;
mod signaling;

pub use config::*;
pub use registry::*;
pub use relay::*;
pub use server::*;
pub use signaling::*;
