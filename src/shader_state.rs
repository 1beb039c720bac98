//! Setters that translate registry lookups into uniform writes.
//!
//! Uniform state is sticky: whatever a setter writes stays in effect for every
//! following draw until another setter overwrites it. Callers that draw with
//! the individual setters must therefore set color or texture, UV scale and
//! material before each draw. [`DrawDescriptor`] bundles all of it so a single
//! [`ShaderState::apply`] leaves nothing behind from the previous object: state
//! a descriptor does not provide is reset to the neutral values below.

use crate::{
    error::ShaderStateError,
    gpu::{PrimitiveMesh, TextureSlot},
    material::MaterialRegistry,
    registry::TextureRegistry,
    transform::{self, Transform},
    uniform::{UniformName, UniformSink},
};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

const NEUTRAL_UV_SCALE: [f32; 2] = [1.0, 1.0];

/// Material of draws that name none or name an undefined one: white diffuse
/// and no specular highlight.
const NEUTRAL_DIFFUSE: [f32; 3] = [1.0, 1.0, 1.0];
const NEUTRAL_SPECULAR: [f32; 3] = [0.0, 0.0, 0.0];
const NEUTRAL_SHININESS: f32 = 0.0;

fn white() -> [f32; 4] {
    WHITE
}

fn unit_uv_scale() -> [f32; 2] {
    NEUTRAL_UV_SCALE
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Color([f32; 4]),
    Texture {
        tag: String,
        #[serde(default = "unit_uv_scale")]
        uv_scale: [f32; 2],
    },
}

/// Everything needed to draw one object.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DrawDescriptor {
    pub mesh: PrimitiveMesh,
    #[serde(default)]
    pub transform: Transform,
    pub surface: Surface,
    #[serde(default)]
    pub material: Option<String>,
    /// Color used when the surface texture is not registered.
    #[serde(default = "white")]
    pub fallback_color: [f32; 4],
}

impl DrawDescriptor {
    pub fn colored(mesh: PrimitiveMesh, transform: Transform, color: [f32; 4]) -> Self {
        Self {
            mesh,
            transform,
            surface: Surface::Color(color),
            material: None,
            fallback_color: WHITE,
        }
    }

    pub fn textured(
        mesh: PrimitiveMesh,
        transform: Transform,
        tag: impl Into<String>,
        uv_scale: [f32; 2],
    ) -> Self {
        Self {
            mesh,
            transform,
            surface: Surface::Texture {
                tag: tag.into(),
                uv_scale,
            },
            material: None,
            fallback_color: WHITE,
        }
    }

    pub fn with_material(mut self, tag: impl Into<String>) -> Self {
        self.material = Some(tag.into());
        self
    }
}

/// Which optional state [`ShaderState::apply`] had to leave out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub missing_texture: bool,
    pub missing_material: bool,
}

pub struct ShaderState<'a> {
    textures: &'a TextureRegistry,
    materials: &'a MaterialRegistry,
}

impl<'a> ShaderState<'a> {
    pub fn new(textures: &'a TextureRegistry, materials: &'a MaterialRegistry) -> Self {
        Self {
            textures,
            materials,
        }
    }

    /// Switches to flat color mode with `rgba`.
    pub fn set_color(&self, sink: &mut impl UniformSink, rgba: [f32; 4]) {
        sink.set_uniform(UniformName::UseTexture, false.into());
        sink.set_uniform(UniformName::ObjectColor, rgba.into());
    }

    /// Switches to texture mode sampling the unit `tag` is bound to.
    pub fn set_texture(
        &self,
        sink: &mut impl UniformSink,
        tag: &str,
    ) -> Result<TextureSlot, ShaderStateError> {
        let slot = self
            .textures
            .find_slot(tag)
            .ok_or_else(|| ShaderStateError::UnknownTexture(tag.to_string()))?;

        sink.set_uniform(UniformName::UseTexture, true.into());
        sink.set_uniform(UniformName::ObjectTexture, slot.into());

        Ok(slot)
    }

    pub fn set_uv_scale(&self, sink: &mut impl UniformSink, u: f32, v: f32) {
        sink.set_uniform(UniformName::UvScale, [u, v].into());
    }

    /// Uploads the material defined under `tag`. Without any materials
    /// defined this does nothing.
    pub fn set_material(
        &self,
        sink: &mut impl UniformSink,
        tag: &str,
    ) -> Result<(), ShaderStateError> {
        if self.materials.is_empty() {
            return Ok(());
        }

        let material = self
            .materials
            .resolve(tag)
            .ok_or_else(|| ShaderStateError::UnknownMaterial(tag.to_string()))?;

        sink.set_uniform(UniformName::MaterialDiffuse, material.diffuse_color.into());
        sink.set_uniform(UniformName::MaterialSpecular, material.specular_color.into());
        sink.set_uniform(UniformName::MaterialShininess, material.shininess.into());

        Ok(())
    }

    /// Uploads the neutral material.
    pub fn reset_material(&self, sink: &mut impl UniformSink) {
        sink.set_uniform(UniformName::MaterialDiffuse, NEUTRAL_DIFFUSE.into());
        sink.set_uniform(UniformName::MaterialSpecular, NEUTRAL_SPECULAR.into());
        sink.set_uniform(UniformName::MaterialShininess, NEUTRAL_SHININESS.into());
    }

    /// Uploads the transform, surface, UV scale and material of `draw`.
    /// Unknown tags are logged and the draw goes ahead with the fallback color
    /// or the neutral material.
    pub fn apply(&self, sink: &mut impl UniformSink, draw: &DrawDescriptor) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();

        transform::upload(sink, &draw.transform);

        let [u, v] = match &draw.surface {
            Surface::Color(rgba) => {
                self.set_color(sink, *rgba);
                NEUTRAL_UV_SCALE
            }
            Surface::Texture { tag, uv_scale } => {
                if let Err(e) = self.set_texture(sink, tag) {
                    log::warn!("Drawing {} untextured: {}", draw.mesh, e);
                    outcome.missing_texture = true;
                    self.set_color(sink, draw.fallback_color);
                }
                *uv_scale
            }
        };
        self.set_uv_scale(sink, u, v);

        let material_set = match &draw.material {
            Some(tag) if !self.materials.is_empty() => match self.set_material(sink, tag) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Drawing {} with the neutral material: {}", draw.mesh, e);
                    outcome.missing_material = true;
                    false
                }
            },
            _ => false,
        };
        if !material_set {
            self.reset_material(sink);
        }

        outcome
    }
}
