//! Real-time direct-messaging channel
//!
//! A WebSocket endpoint with an actor per connection. A connection must
//! authenticate with an `AUTH` frame before it is addressable; once
//! authenticated it is bound in the [`registry::ConnectionRegistry`] and
//! can exchange directed messages with other live connections.

pub mod actor;
pub mod handler;
pub mod protocol;
pub mod registry;

pub use handler::ws_upgrade;
pub use registry::{ConnectionHandle, ConnectionRegistry};
