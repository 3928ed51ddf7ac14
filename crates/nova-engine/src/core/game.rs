use crate::render::Batch;

use super::ctx::{StartCtx, UpdateCtx};

/// Control directive returned from game callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// A game driven by the runtime.
///
/// Per frame the runtime calls `on_update`, resets the renderer's frame
/// counters, then `on_render` with a batch bound to the window's device.
pub trait Game {
    /// Runs once the device exists; load resources here.
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> anyhow::Result<()>;

    fn on_update(&mut self, ctx: &mut UpdateCtx<'_>) -> AppControl;

    /// Draws the frame. Open a scene with `batch.begin_scene(&camera)`;
    /// the runtime closes whatever scene is still open afterwards.
    fn on_render(&mut self, batch: &mut Batch<'_>);

    /// New drawable size in physical pixels.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }
}
