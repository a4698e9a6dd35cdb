mod registry;
mod session_handle;

pub use registry::*;
pub use session_handle::*;
