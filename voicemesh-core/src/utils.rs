pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Path the relay serves its WebSocket endpoint on unless configured otherwise.
pub const DEFAULT_RELAY_PATH: &str = "/voice";
