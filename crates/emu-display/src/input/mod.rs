//! Input subsystem.
//!
//! Public types are platform-agnostic. `platform::winit` translates raw
//! window events into [`KeyDownEvent`]s; [`InputContext`] tracks keyboards and
//! gates forwarding; [`KeyDownRelay`] fans events out to subscribers.

mod context;
pub mod platform;
mod relay;
mod types;

pub use context::InputContext;
pub use relay::{EventRelay, KeyDownRelay, SubscriptionId};
pub use types::{Key, KeyDownEvent, KeyboardId};
