//! Pipeline Module - Host integration
//!
//! Wires the scroll system into a terminal host:
//!
//! ```text
//! crossterm events → route (viewport + notify) → broadcaster tick → consumers
//! ```
//!
//! One `tick` per frame keeps the broadcaster's guarantee: at most one
//! fan-out per rendered frame regardless of event volume.

pub mod mount;

pub use mount::{MountHandle, mount, run, tick};
