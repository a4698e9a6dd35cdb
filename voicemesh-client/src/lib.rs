mod error;
mod media;
mod peer;
mod session;
mod signaling;
mod transport;

pub use error::*;
pub use media::*;
pub use peer::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;
