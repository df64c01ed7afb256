pub mod client_id;
pub mod connection_stage;
pub mod numeric_id;

pub use client_id::ClientId;
pub use connection_stage::{ConnectionStage, Membership};
pub use numeric_id::{FeedId, RoomId};
