//! Services for the local store, the remote API and timer flows

pub mod api;
pub mod selection;
pub mod store;
pub mod sync;
pub mod timers;
