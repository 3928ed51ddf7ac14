use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::audio::{AudioError, Wave};
use crate::render::shader::{self, BuiltinShaders, Shader};
use crate::render::{DeviceError, GraphicsDevice, ImageData, Texture};
use crate::scene::SpriteAtlas;
use crate::text::{Font, FontError, DEFAULT_CHARACTER_SET};

use super::cache::ResourceCache;

const IMAGE_DIR: &str = "images";
const IMAGE_EXTENSION: &str = "png";
const FONT_DIR: &str = "fonts";
const FONT_EXTENSION: &str = "ttf";
const ATLAS_EXTENSION: &str = "json";
const AUDIO_DIR: &str = "audio";
const AUDIO_EXTENSION: &str = "wav";

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {key:?}")]
    Image {
        key: String,
        #[source]
        source: image::ImageError,
    },

    #[error("malformed sprite atlas {key:?}")]
    Atlas {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load audio {key:?}")]
    Audio {
        key: String,
        #[source]
        source: AudioError,
    },

    #[error(transparent)]
    Font(#[from] FontError),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Texture, atlas, font, audio and shader caches rooted at a content directory.
///
/// Files are found by key: `<root>/images/<key>.png`, `<root>/fonts/<key>.ttf`
/// and `<root>/audio/<key>.wav`. A texture with a `<key>.json` beside it also
/// loads that file as its sprite atlas. The built-in shaders are compiled up
/// front and registered under their program keys.
#[derive(Debug)]
pub struct ResourceManager {
    root: PathBuf,
    textures: ResourceCache<Texture>,
    atlases: ResourceCache<SpriteAtlas>,
    fonts: ResourceCache<Font>,
    sounds: ResourceCache<Wave>,
    shaders: ResourceCache<Shader>,
    builtin: BuiltinShaders,
}

impl ResourceManager {
    pub fn new(device: &mut dyn GraphicsDevice, root: impl Into<PathBuf>) -> Result<Self, ResourceError> {
        let white = Texture::create(device, "default white", &ImageData::white())?;
        let font_atlas = Rc::new(Texture::create(device, "default font atlas", &ImageData::white())?);

        let [sprite, line, point, circle] = shader::builtin_programs(device);
        let sprite = Shader::compile(device, &sprite)?;
        let line = Shader::compile(device, &line)?;
        let point = Shader::compile(device, &point)?;
        let circle = Shader::compile(device, &circle)?;
        let builtin = BuiltinShaders::from_shaders(&sprite, &line, &point, &circle);

        let mut shaders = ResourceCache::new("shader", sprite.clone());
        for s in [sprite, line, point, circle] {
            shaders.insert(s.key(), s);
        }
        shaders.drain_events();

        let root = root.into();
        log::info!("resource root {}", root.display());
        Ok(Self {
            root,
            textures: ResourceCache::new("texture", white),
            atlases: ResourceCache::new("sprite atlas", SpriteAtlas::default()),
            fonts: ResourceCache::new("font", Font::empty(font_atlas)),
            sounds: ResourceCache::new("audio", Wave::tone()),
            shaders,
            builtin,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids of the built-in programs, for building a `BatchRenderer`.
    pub fn builtin_shaders(&self) -> BuiltinShaders {
        self.builtin
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Loads `<root>/images/<key>.png` unless `key` is already loaded, and
    /// its sprite atlas when a `<key>.json` sits next to it.
    pub fn load_texture(&mut self, device: &mut dyn GraphicsDevice, key: &str) -> Result<Rc<Texture>, ResourceError> {
        if let Some(texture) = self.textures.try_get(key) {
            return Ok(texture);
        }
        let path = self.path_for(IMAGE_DIR, key, IMAGE_EXTENSION);
        let bytes = read(&path)?;
        let texture = self.load_texture_from_memory(device, key, &bytes)?;

        let atlas_path = path.with_extension(ATLAS_EXTENSION);
        if atlas_path.is_file() {
            let json = read(&atlas_path)?;
            self.load_atlas_from_memory(key, &String::from_utf8_lossy(&json))?;
        }
        Ok(texture)
    }

    /// Decodes an encoded image and stores it under `key`.
    pub fn load_texture_from_memory(
        &mut self,
        device: &mut dyn GraphicsDevice,
        key: &str,
        bytes: &[u8],
    ) -> Result<Rc<Texture>, ResourceError> {
        let image = decode_image(key, bytes)?;
        let texture = Texture::create(device, key, &image)?;
        log::debug!("loaded texture {key:?} ({}x{})", image.width, image.height);
        Ok(self.textures.insert(key, texture))
    }

    pub fn texture(&mut self, key: &str) -> Rc<Texture> {
        self.textures.get(key)
    }

    pub fn unload_texture(&mut self, key: &str) -> bool {
        self.textures.unload(key)
    }

    pub fn textures(&mut self) -> &mut ResourceCache<Texture> {
        &mut self.textures
    }

    // ── atlases ───────────────────────────────────────────────────────────

    /// Parses atlas JSON and stores it under `key`, the key of its texture.
    pub fn load_atlas_from_memory(&mut self, key: &str, json: &str) -> Result<Rc<SpriteAtlas>, ResourceError> {
        let atlas = SpriteAtlas::from_json(json).map_err(|source| ResourceError::Atlas {
            key: key.to_string(),
            source,
        })?;
        log::debug!("loaded sprite atlas {key:?} ({} frames)", atlas.len());
        Ok(self.atlases.insert(key, atlas))
    }

    /// The atlas of texture `key`, or an empty one.
    pub fn atlas(&mut self, key: &str) -> Rc<SpriteAtlas> {
        self.atlases.get(key)
    }

    pub fn unload_atlas(&mut self, key: &str) -> bool {
        self.atlases.unload(key)
    }

    // ── fonts ─────────────────────────────────────────────────────────────

    /// Rasterizes `<root>/fonts/<key>.ttf` at `px` pixels unless `key` is already loaded.
    pub fn load_font(&mut self, device: &mut dyn GraphicsDevice, key: &str, px: u32) -> Result<Rc<Font>, ResourceError> {
        if let Some(font) = self.fonts.try_get(key) {
            return Ok(font);
        }
        let path = self.path_for(FONT_DIR, key, FONT_EXTENSION);
        let bytes = read(&path)?;
        let font = Font::rasterize(device, key, &bytes, px, DEFAULT_CHARACTER_SET)?;
        Ok(self.fonts.insert(key, font))
    }

    pub fn font(&mut self, key: &str) -> Rc<Font> {
        self.fonts.get(key)
    }

    pub fn unload_font(&mut self, key: &str) -> bool {
        self.fonts.unload(key)
    }

    pub fn fonts(&mut self) -> &mut ResourceCache<Font> {
        &mut self.fonts
    }

    // ── audio ─────────────────────────────────────────────────────────────

    /// Decodes `<root>/audio/<key>.wav` unless `key` is already loaded.
    pub fn load_audio(&mut self, key: &str) -> Result<Rc<Wave>, ResourceError> {
        if let Some(wave) = self.sounds.try_get(key) {
            return Ok(wave);
        }
        let path = self.path_for(AUDIO_DIR, key, AUDIO_EXTENSION);
        let bytes = read(&path)?;
        self.load_audio_from_memory(key, &bytes)
    }

    pub fn load_audio_from_memory(&mut self, key: &str, bytes: &[u8]) -> Result<Rc<Wave>, ResourceError> {
        let wave = Wave::decode(bytes).map_err(|source| ResourceError::Audio {
            key: key.to_string(),
            source,
        })?;
        log::debug!("loaded audio {key:?} ({:.2}s)", wave.duration().as_secs_f32());
        Ok(self.sounds.insert(key, wave))
    }

    /// The wave stored under `key`, or a two-note beep.
    pub fn audio(&mut self, key: &str) -> Rc<Wave> {
        self.sounds.get(key)
    }

    pub fn unload_audio(&mut self, key: &str) -> bool {
        self.sounds.unload(key)
    }

    pub fn sounds(&mut self) -> &mut ResourceCache<Wave> {
        &mut self.sounds
    }

    // ── shaders ───────────────────────────────────────────────────────────

    pub fn shader(&mut self, key: &str) -> Rc<Shader> {
        self.shaders.get(key)
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    /// Frees the device side of unloaded resources nobody holds anymore.
    ///
    /// Returns the number of textures deleted.
    pub fn release_unused(&mut self, device: &mut dyn GraphicsDevice) -> usize {
        let mut released = 0;
        for texture in self.textures.take_unused() {
            device.delete_texture(texture.id());
            released += 1;
        }
        for font in self.fonts.take_unused() {
            match Rc::try_unwrap(font.into_texture()) {
                Ok(atlas) => {
                    device.delete_texture(atlas.id());
                    released += 1;
                }
                Err(_) => log::debug!("font atlas still shared; kept"),
            }
        }
        if released > 0 {
            log::debug!("released {released} textures");
        }
        // CPU-only resources just need their last handle dropped.
        drop(self.atlases.take_unused());
        drop(self.sounds.take_unused());
        released
    }

    /// Deletes everything the manager created, handles still held elsewhere included.
    pub fn release(self, device: &mut dyn GraphicsDevice) {
        let mut textures = HashSet::new();
        textures.extend(self.textures.take_all().iter().map(|t| t.id()));
        textures.extend(self.fonts.take_all().iter().map(|f| f.texture().id()));
        for id in textures {
            device.delete_texture(id);
        }

        let shaders: HashSet<_> = self.shaders.take_all().iter().map(|s| s.id()).collect();
        for id in shaders {
            device.delete_shader(id);
        }
    }

    fn path_for(&self, dir: &str, key: &str, extension: &str) -> PathBuf {
        self.root.join(dir).join(key).with_extension(extension)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ResourceError> {
    std::fs::read(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes to RGBA8 and premultiplies alpha.
fn decode_image(key: &str, bytes: &[u8]) -> Result<ImageData, ResourceError> {
    let image = image::load_from_memory(bytes).map_err(|source| ResourceError::Image {
        key: key.to_string(),
        source,
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut pixels = rgba.into_raw();
    for px in pixels.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }

    Ok(ImageData { width, height, pixels })
}
