// Gateway side of the bridge: everything that talks to the SFU's HTTP RPC API.
pub mod client;
pub mod ids;
pub mod reply;
pub mod request;

pub use client::{GatewayClient, GatewaySettings};
pub use ids::{GatewayScope, GatewaySessionId, HandleId};
pub use reply::GatewayReply;
pub use request::{GatewayRequest, VIDEOROOM_PLUGIN};
