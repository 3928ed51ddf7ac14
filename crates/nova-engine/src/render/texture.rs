use glam::Vec2;

use super::device::{DeviceError, GraphicsDevice, ImageData, TextureId};

/// A texture living on the device.
///
/// Shared through `Rc<Texture>` handed out by the resource cache; renderers
/// only copy the [`TextureId`] for the duration of a batch.
#[derive(Debug, PartialEq, Eq)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    label: String,
}

impl Texture {
    pub fn create(
        device: &mut dyn GraphicsDevice,
        label: impl Into<String>,
        image: &ImageData,
    ) -> Result<Self, DeviceError> {
        let label = label.into();
        let id = device.create_texture(&label, image)?;
        Ok(Self {
            id,
            width: image.width,
            height: image.height,
            label,
        })
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}
