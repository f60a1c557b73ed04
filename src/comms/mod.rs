//! Real-time fan-out of recorded changes to subscribed connections.

pub mod broadcast;
pub mod ws;

pub use broadcast::{Broadcaster, Connection, ConnectionId, SendError};
pub use ws::WsConnection;
