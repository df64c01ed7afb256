pub mod connection;
pub mod hub;
pub mod messages;
pub mod router;

pub(crate) mod context;
pub(crate) mod handlers;

pub use connection::SignalingConnection;
pub use hub::SignalingHub;
pub use messages::{ClientRequest, ServerMessage};
