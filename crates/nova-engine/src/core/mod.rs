//! The contract between the runtime and a game.

mod ctx;
mod game;
mod overlay;

pub use ctx::{StartCtx, UpdateCtx};
pub use game::{AppControl, Game};
pub(crate) use overlay::{DebugOverlay, OverlayStats};
