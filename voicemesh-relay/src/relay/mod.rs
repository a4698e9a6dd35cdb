mod relay;
mod relay_session;

pub use relay::*;
pub use relay_session::*;
