pub mod policy;
pub mod registry;

pub use policy::RoomPolicy;
pub use registry::RoomRegistry;
