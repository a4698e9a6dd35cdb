mod relay_channel;
mod signal_sender;
mod ws_connector;

pub use relay_channel::*;
pub use signal_sender::*;
pub use ws_connector::*;
