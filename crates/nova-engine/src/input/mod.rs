//! Keyboard input.
//!
//! The game sees held keys through [`InputState`] and this frame's
//! transitions through [`InputFrame`]; neither exposes winit types.

mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState};
