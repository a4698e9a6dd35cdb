mod link_state;
mod manager;
mod peer_link;

pub use link_state::*;
pub use manager::*;
pub use peer_link::*;
