// Server module entry
// Listener construction and per-connection handling

pub mod connection;
pub mod listener;

pub use connection::accept_connection;
pub use listener::create_listener;
