use std::path::{Path, PathBuf};

use crate::{
    decode::ImageDecoder,
    error::TextureError,
    gpu::{GpuTextureId, GraphicsContext, MAX_TEXTURE_UNITS, SamplerSettings, TextureSlot},
};

pub struct TextureEntry {
    tag: String,
    handle: GpuTextureId,
    width: u32,
    height: u32,
    channels: u8,
}

impl TextureEntry {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn handle(&self) -> GpuTextureId {
        self.handle
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }
}

/// An image file to load under a tag.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TextureSource {
    pub path: PathBuf,
    pub tag: String,
}

/// Image textures addressed by tag. Slots are handed out in load order and
/// never exceed [`MAX_TEXTURE_UNITS`].
pub struct TextureRegistry {
    textures: Vec<TextureEntry>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            textures: Vec::with_capacity(MAX_TEXTURE_UNITS),
        }
    }

    pub fn capacity(&self) -> usize {
        MAX_TEXTURE_UNITS
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Decodes `path` and uploads it as a repeating, linearly filtered,
    /// mipmapped texture under `tag`.
    pub fn load(
        &mut self,
        ctx: &mut impl GraphicsContext,
        decoder: &impl ImageDecoder,
        path: impl AsRef<Path>,
        tag: impl Into<String>,
    ) -> Result<TextureSlot, TextureError> {
        let path = path.as_ref();
        let tag = tag.into();

        let Some(slot) = TextureSlot::new(self.textures.len()) else {
            return Err(TextureError::CapacityExceeded {
                capacity: MAX_TEXTURE_UNITS,
            });
        };

        if self.find_slot(&tag).is_some() {
            return Err(TextureError::DuplicateTag(tag));
        }

        let decoded = decoder.decode(path)?;

        if !matches!(decoded.channels, 3 | 4) {
            return Err(TextureError::UnsupportedFormat {
                path: path.to_path_buf(),
                channels: decoded.channels,
            });
        }

        let max = ctx.max_texture_dimension();
        if decoded.width > max || decoded.height > max {
            return Err(TextureError::TooLarge {
                path: path.to_path_buf(),
                width: decoded.width,
                height: decoded.height,
                max,
            });
        }

        let rgba = decoded
            .to_rgba8()
            .ok_or_else(|| TextureError::MalformedPixels {
                path: path.to_path_buf(),
                width: decoded.width,
                height: decoded.height,
                channels: decoded.channels,
                len: decoded.pixels.len(),
            })?;

        log::info!(
            "Loaded image {}, width: {}, height: {}, channels: {}",
            path.display(),
            decoded.width,
            decoded.height,
            decoded.channels
        );

        let handle = ctx.create_texture(&tag, &rgba, SamplerSettings::REPEAT_LINEAR);

        self.textures.push(TextureEntry {
            tag,
            handle,
            width: decoded.width,
            height: decoded.height,
            channels: decoded.channels,
        });

        Ok(slot)
    }

    /// Loads every source, logging and skipping the ones that fail. Paths are
    /// resolved against `base_dir`. Returns how many textures were registered.
    pub fn load_all(
        &mut self,
        ctx: &mut impl GraphicsContext,
        decoder: &impl ImageDecoder,
        base_dir: &Path,
        sources: &[TextureSource],
    ) -> usize {
        let mut loaded = 0;

        for source in sources {
            match self.load(ctx, decoder, base_dir.join(&source.path), source.tag.clone()) {
                Ok(_) => loaded += 1,
                Err(e) => log::warn!("Skipping texture \"{}\": {}", source.tag, e),
            }
        }

        loaded
    }

    /// Binds every texture to the unit matching its slot.
    pub fn bind_all(&self, ctx: &mut impl GraphicsContext) {
        for (slot, entry) in self.iter() {
            ctx.bind_texture_unit(slot, entry.handle);
        }
    }

    pub fn find_slot(&self, tag: &str) -> Option<TextureSlot> {
        self.iter()
            .find(|(_, entry)| entry.tag == tag)
            .map(|(slot, _)| slot)
    }

    pub fn find_handle(&self, tag: &str) -> Option<GpuTextureId> {
        self.textures
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.handle)
    }

    pub fn get(&self, slot: TextureSlot) -> Option<&TextureEntry> {
        self.textures.get(slot.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureSlot, &TextureEntry)> {
        self.textures
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| TextureSlot::new(index).map(|slot| (slot, entry)))
    }

    /// Releases every GPU texture. Calling it again is a no-op.
    pub fn release_all(&mut self, ctx: &mut impl GraphicsContext) {
        for entry in self.textures.drain(..) {
            ctx.release_texture(entry.handle);
        }
    }
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
