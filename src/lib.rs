pub mod api;
pub mod config;
pub mod errors;
pub mod frontend;
pub mod gateway;
pub mod rooms;
pub mod server;
pub mod shared_types;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use frontend::{SignalingConnection, SignalingHub};
pub use gateway::{GatewayClient, GatewaySettings};
pub use server::{AppState, build_router, serve};
