use enumset::EnumSet;
use slotmap::SlotMap;

use crate::{
    error::GraphicsError,
    gpu::{
        GpuTextureId, GraphicsContext, MAX_TEXTURE_UNITS, PrimitiveMesh, SamplerSettings,
        TextureSlot,
    },
    texture,
    uniform::{UniformBlock, UniformName, UniformSink, UniformValue},
};

/// A draw submitted during the frame. `uniform_offset` points at the
/// snapshot of the uniform block taken when the draw was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedDraw {
    pub mesh: PrimitiveMesh,
    pub uniform_offset: u32,
}

#[derive(Debug, Default)]
pub struct FrameRecording {
    pub draws: Vec<RecordedDraw>,
    /// Bytes of per-draw uniform snapshots written to the uniform buffer.
    pub uniform_bytes: u64,
}

/// wgpu implementation of [`GraphicsContext`].
///
/// Uniform writes land in a CPU [`UniformBlock`]; every draw appends a packed
/// copy of it to a staging area, so later writes never affect earlier draws.
/// [`WgpuContext::finish_frame`] uploads the staging area in one write and hands
/// the draw list to whoever encodes the render pass (bind the uniform buffer
/// with a dynamic offset per draw).
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    textures: SlotMap<GpuTextureId, texture::Texture>,
    units: TextureUnits,
    loaded_meshes: EnumSet<PrimitiveMesh>,
    uniforms: UniformBlock,
    uniform_buffer: wgpu::Buffer,
    staging: UniformStaging,
    draws: Vec<RecordedDraw>,
}

/// Texture unit to texture assignments.
#[derive(Debug, Default)]
struct TextureUnits([Option<GpuTextureId>; MAX_TEXTURE_UNITS]);

impl TextureUnits {
    fn bind(&mut self, slot: TextureSlot, texture: GpuTextureId) {
        self.0[slot.index()] = Some(texture);
    }

    fn get(&self, slot: TextureSlot) -> Option<GpuTextureId> {
        self.0[slot.index()]
    }

    /// Unbinds `texture` from every unit it is bound to.
    fn unbind(&mut self, texture: GpuTextureId) {
        for unit in self.0.iter_mut().filter(|unit| **unit == Some(texture)) {
            *unit = None;
        }
    }
}

/// Packed uniform block snapshots, one per draw, each starting on a multiple
/// of `stride`.
#[derive(Debug)]
struct UniformStaging {
    stride: usize,
    bytes: Vec<u8>,
}

impl UniformStaging {
    fn new(block_len: usize, alignment: usize) -> Self {
        Self {
            stride: block_len.next_multiple_of(alignment.max(1)),
            bytes: vec![],
        }
    }

    /// Appends a snapshot of `block` and returns its offset.
    fn push(&mut self, block: &UniformBlock) -> u32 {
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(&block.cast());
        self.bytes.resize(offset + self.stride, 0);
        offset as u32
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// New uniform buffer size when `needed` bytes no longer fit in `current`.
fn grown_buffer_size(current: u64, needed: u64) -> Option<u64> {
    (needed > current).then(|| needed.next_power_of_two())
}

impl WgpuContext {
    /// Creates a context without a surface. Failing to get an adapter or a
    /// device is fatal for the caller.
    pub async fn new_headless() -> Result<Self, GraphicsError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let adapter_info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", adapter_info.name, adapter_info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("stagehand device"),
                required_features: wgpu::Features::empty(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self::from_device(device, queue, adapter_info))
    }

    pub fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        adapter_info: wgpu::AdapterInfo,
    ) -> Self {
        let uniforms = UniformBlock::standard();
        let alignment = device.limits().min_uniform_buffer_offset_alignment as usize;
        let staging = UniformStaging::new(uniforms.cast().len(), alignment);

        let uniform_buffer = create_uniform_buffer(&device, staging.stride as u64);

        Self {
            device,
            queue,
            adapter_info,
            textures: SlotMap::with_key(),
            units: TextureUnits::default(),
            loaded_meshes: EnumSet::empty(),
            uniforms,
            uniform_buffer,
            staging,
            draws: vec![],
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    pub fn texture(&self, id: GpuTextureId) -> Option<&texture::Texture> {
        self.textures.get(id)
    }

    pub fn bound_texture(&self, slot: TextureSlot) -> Option<&texture::Texture> {
        self.units.get(slot).and_then(|id| self.textures.get(id))
    }

    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    pub fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.uniform_buffer
    }

    pub fn loaded_meshes(&self) -> EnumSet<PrimitiveMesh> {
        self.loaded_meshes
    }

    /// Uploads the uniform snapshots of every draw issued since the last call
    /// and returns the draw list.
    pub fn finish_frame(&mut self) -> FrameRecording {
        let uniform_bytes = self.staging.bytes().len() as u64;

        if let Some(size) = grown_buffer_size(self.uniform_buffer.size(), uniform_bytes) {
            log::debug!("Growing uniform buffer to {size} bytes");
            self.uniform_buffer = create_uniform_buffer(&self.device, size);
        }

        if uniform_bytes > 0 {
            self.queue.write_buffer(&self.uniform_buffer, 0, self.staging.bytes());
        }
        self.staging.clear();

        FrameRecording {
            draws: std::mem::take(&mut self.draws),
            uniform_bytes,
        }
    }
}

fn create_uniform_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Uniforms"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl UniformSink for WgpuContext {
    fn set_uniform(&mut self, name: UniformName, value: UniformValue) {
        self.uniforms.set_uniform(name, value);
    }
}

impl GraphicsContext for WgpuContext {
    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn create_texture(
        &mut self,
        label: &str,
        image: &image::RgbaImage,
        sampler: SamplerSettings,
    ) -> GpuTextureId {
        let texture = texture::Texture::from_rgba8(&self.device, &self.queue, label, image, sampler);
        self.textures.insert(texture)
    }

    fn bind_texture_unit(&mut self, slot: TextureSlot, texture: GpuTextureId) {
        self.units.bind(slot, texture);
    }

    fn release_texture(&mut self, texture: GpuTextureId) {
        if self.textures.remove(texture).is_some() {
            self.units.unbind(texture);
        }
    }

    fn load_mesh(&mut self, mesh: PrimitiveMesh) {
        self.loaded_meshes.insert(mesh);
    }

    fn draw_mesh(&mut self, mesh: PrimitiveMesh) {
        if !self.loaded_meshes.contains(mesh) {
            log::warn!("Skipping draw of {mesh}: mesh was never loaded");
            return;
        }

        let uniform_offset = self.staging.push(&self.uniforms);

        self.draws.push(RecordedDraw {
            mesh,
            uniform_offset,
        });
    }
}
