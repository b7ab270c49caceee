// Network adapter modules split by client sockets vs operator HTTP routes.

pub mod admin;
pub mod client;

pub use admin::resize_arena_handler;
pub use client::{spawn_arena_serializer, ws_handler};
