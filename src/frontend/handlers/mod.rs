pub(crate) mod media;
pub(crate) mod room;
pub(crate) mod session;

pub(crate) use media::{handle_configure, handle_publish, handle_subscribe, handle_trickle};
pub(crate) use room::{handle_create_room, handle_join_room, handle_leave};
pub(crate) use session::{handle_attach_plugin, handle_create_session};
