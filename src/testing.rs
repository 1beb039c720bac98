//! Test doubles for the graphics context and image decoder.

use std::{cell::Cell, path::Path};

use slotmap::SlotMap;

use crate::{
    decode::{DecodedImage, ImageDecoder},
    error::TextureError,
    gpu::{GpuTextureId, GraphicsContext, PrimitiveMesh, SamplerSettings, TextureSlot},
    uniform::{UniformBlock, UniformName, UniformSink, UniformValue},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetUniform(UniformName, UniformValue),
    Draw(PrimitiveMesh),
}

/// Records everything written to it, in order.
pub struct RecordingContext {
    handles: SlotMap<GpuTextureId, ()>,
    pub max_texture_dimension: u32,
    pub created_textures: Vec<(String, SamplerSettings)>,
    pub bound_units: Vec<(usize, GpuTextureId)>,
    pub released_textures: Vec<GpuTextureId>,
    pub loaded_meshes: Vec<PrimitiveMesh>,
    pub calls: Vec<Call>,
    pub uniforms: UniformBlock,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self {
            handles: SlotMap::with_key(),
            max_texture_dimension: wgpu::Limits::default().max_texture_dimension_2d,
            created_textures: vec![],
            bound_units: vec![],
            released_textures: vec![],
            loaded_meshes: vec![],
            calls: vec![],
            uniforms: UniformBlock::default(),
        }
    }
}

impl RecordingContext {
    pub fn with_max_texture_dimension(max: u32) -> Self {
        Self {
            max_texture_dimension: max,
            ..Self::default()
        }
    }

    pub fn uniform_writes(&self) -> Vec<(UniformName, UniformValue)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetUniform(name, value) => Some((*name, *value)),
                Call::Draw(_) => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<PrimitiveMesh> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw(mesh) => Some(*mesh),
                Call::SetUniform(..) => None,
            })
            .collect()
    }

    pub fn value(&self, name: UniformName) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl UniformSink for RecordingContext {
    fn set_uniform(&mut self, name: UniformName, value: UniformValue) {
        self.calls.push(Call::SetUniform(name, value));
        self.uniforms.set_uniform(name, value);
    }
}

impl GraphicsContext for RecordingContext {
    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    fn create_texture(
        &mut self,
        label: &str,
        _image: &image::RgbaImage,
        sampler: SamplerSettings,
    ) -> GpuTextureId {
        self.created_textures.push((label.to_string(), sampler));
        self.handles.insert(())
    }

    fn bind_texture_unit(&mut self, slot: TextureSlot, texture: GpuTextureId) {
        self.bound_units.push((slot.index(), texture));
    }

    fn release_texture(&mut self, texture: GpuTextureId) {
        self.handles.remove(texture);
        self.released_textures.push(texture);
    }

    fn load_mesh(&mut self, mesh: PrimitiveMesh) {
        self.loaded_meshes.push(mesh);
    }

    fn draw_mesh(&mut self, mesh: PrimitiveMesh) {
        self.calls.push(Call::Draw(mesh));
    }
}

/// Produces blank images of a fixed shape without touching the filesystem.
pub struct StubDecoder {
    width: u32,
    height: u32,
    channels: u8,
    fail_all: bool,
    failing_path: Option<String>,
    missing_bytes: usize,
    calls: Cell<usize>,
}

impl StubDecoder {
    pub fn with_channels(width: u32, height: u32, channels: u8) -> Self {
        Self {
            width,
            height,
            channels,
            fail_all: false,
            failing_path: None,
            missing_bytes: 0,
            calls: Cell::new(0),
        }
    }

    pub fn rgb(width: u32, height: u32) -> Self {
        Self::with_channels(width, height, 3)
    }

    pub fn rgba(width: u32, height: u32) -> Self {
        Self::with_channels(width, height, 4)
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::rgba(1, 1)
        }
    }

    /// Fails for any path ending in `file_name`.
    pub fn failing_on(self, file_name: &str) -> Self {
        Self {
            failing_path: Some(file_name.to_string()),
            ..self
        }
    }

    /// Returns `missing_bytes` fewer pixel bytes than the dimensions need.
    pub fn truncated(self, missing_bytes: usize) -> Self {
        Self {
            missing_bytes,
            ..self
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ImageDecoder for StubDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, TextureError> {
        self.calls.set(self.calls.get() + 1);

        let fails = self.fail_all
            || self
                .failing_path
                .as_deref()
                .is_some_and(|name| path.ends_with(name));

        if fails {
            return Err(TextureError::Decode {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such file",
                )),
            });
        }

        let len = (self.width * self.height) as usize * self.channels as usize;

        Ok(DecodedImage {
            width: self.width,
            height: self.height,
            channels: self.channels,
            pixels: vec![0; len.saturating_sub(self.missing_bytes)],
        })
    }
}
