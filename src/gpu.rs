use enumset::EnumSetType;
use slotmap::new_key_type;

use crate::uniform::UniformSink;

/// Texture units available to the scene shader.
pub const MAX_TEXTURE_UNITS: usize = 16;

new_key_type! {
    /// GPU-side identity of a texture object.
    pub struct GpuTextureId;
}

/// Texture unit a registered texture is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureSlot(u8);

impl TextureSlot {
    pub fn new(index: usize) -> Option<Self> {
        (index < MAX_TEXTURE_UNITS).then(|| TextureSlot(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<TextureSlot> for crate::uniform::UniformValue {
    fn from(slot: TextureSlot) -> Self {
        crate::uniform::UniformValue::Int(i32::from(slot.0))
    }
}

/// The primitive shapes the mesh library can generate and draw.
#[derive(
    Debug,
    Hash,
    EnumSetType,
    strum::EnumIter,
    strum::Display,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PrimitiveMesh {
    Plane,
    Cone,
    Cylinder,
    Prism,
    Torus,
    Sphere,
    HalfSphere,
    TaperedCylinder,
    TriangularPyramid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    pub address_mode: wgpu::AddressMode,
    pub filter: wgpu::FilterMode,
    pub mipmaps: bool,
}

impl SamplerSettings {
    pub const REPEAT_LINEAR: SamplerSettings = SamplerSettings {
        address_mode: wgpu::AddressMode::Repeat,
        filter: wgpu::FilterMode::Linear,
        mipmaps: true,
    };
}

/// The graphics context the scene is rendered through. Texture objects,
/// texture unit bindings and draw submission live here; uniform writes go
/// through the [`UniformSink`] supertrait and apply to the next draw.
///
/// Implementations are confined to the thread owning the device.
pub trait GraphicsContext: UniformSink {
    /// Largest width or height accepted by [`GraphicsContext::create_texture`].
    fn max_texture_dimension(&self) -> u32;

    fn create_texture(
        &mut self,
        label: &str,
        image: &image::RgbaImage,
        sampler: SamplerSettings,
    ) -> GpuTextureId;

    fn bind_texture_unit(&mut self, slot: TextureSlot, texture: GpuTextureId);

    fn release_texture(&mut self, texture: GpuTextureId);

    fn load_mesh(&mut self, mesh: PrimitiveMesh);

    /// Draws `mesh` with the uniform state currently set.
    fn draw_mesh(&mut self, mesh: PrimitiveMesh);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_bounded_by_unit_count() {
        assert_eq!(TextureSlot::new(0).map(TextureSlot::index), Some(0));
        assert_eq!(TextureSlot::new(15).map(TextureSlot::index), Some(15));
        assert_eq!(TextureSlot::new(MAX_TEXTURE_UNITS), None);
    }

    #[test]
    fn mesh_names_use_snake_case() {
        let mesh: PrimitiveMesh = serde_json::from_str("\"tapered_cylinder\"").unwrap();
        assert_eq!(mesh, PrimitiveMesh::TaperedCylinder);
        assert_eq!(PrimitiveMesh::HalfSphere.to_string(), "half_sphere");
    }
}
