//! HTTP access to a shared tracking session.

pub mod bridge;
pub mod model;

pub use bridge::{bridge_bind_address, HttpBridge};
