use enumset::EnumSet;

use crate::{
    decode::ImageDecoder,
    error::SceneError,
    gpu::GraphicsContext,
    light::LightConfigurator,
    material::MaterialRegistry,
    registry::TextureRegistry,
    shader_state::{DrawDescriptor, ShaderState},
};

mod description;

pub use description::SceneDescription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Ready,
    Released,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareReport {
    pub textures_loaded: usize,
    pub textures_skipped: usize,
    pub materials_defined: usize,
    pub meshes_loaded: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draws: usize,
    pub missing_textures: usize,
    pub missing_materials: usize,
}

/// Owns the graphics context and the registries of one scene. Prepared once,
/// then rendered any number of frames; textures are released on
/// [`Scene::release`] or drop.
pub struct Scene<G: GraphicsContext> {
    phase: Phase,
    ctx: G,
    textures: TextureRegistry,
    materials: MaterialRegistry,
    objects: Vec<DrawDescriptor>,
}

impl<G: GraphicsContext> Scene<G> {
    pub fn new(ctx: G) -> Self {
        Self {
            phase: Phase::Setup,
            ctx,
            textures: TextureRegistry::new(),
            materials: MaterialRegistry::new(),
            objects: vec![],
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn objects(&self) -> &[DrawDescriptor] {
        &self.objects
    }

    pub fn context(&self) -> &G {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut G {
        &mut self.ctx
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), SceneError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SceneError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    /// Loads and binds textures, defines materials, configures the lights and
    /// loads every mesh the objects use. Textures or materials that fail are
    /// logged and left out.
    pub fn prepare(
        &mut self,
        decoder: &impl ImageDecoder,
        description: &SceneDescription,
    ) -> Result<PrepareReport, SceneError> {
        self.expect_phase(Phase::Setup)?;

        let textures_loaded = self.textures.load_all(
            &mut self.ctx,
            decoder,
            &description.base_dir,
            &description.textures,
        );
        self.textures.bind_all(&mut self.ctx);

        let mut materials_defined = 0;
        for material in &description.materials {
            match self.materials.insert(material.clone()) {
                Ok(()) => materials_defined += 1,
                Err(e) => log::warn!("Skipping material: {}", e),
            }
        }

        LightConfigurator::configure(&mut self.ctx, &description.lights);

        let meshes: EnumSet<_> = description.objects.iter().map(|object| object.mesh).collect();
        for mesh in meshes {
            self.ctx.load_mesh(mesh);
        }

        self.objects = description.objects.clone();
        self.phase = Phase::Ready;

        let report = PrepareReport {
            textures_loaded,
            textures_skipped: description.textures.len() - textures_loaded,
            materials_defined,
            meshes_loaded: meshes.len(),
        };
        log::info!("Scene prepared: {:?}", report);

        Ok(report)
    }

    /// Draws every object in list order, setting all of its state first.
    pub fn render_frame(&mut self) -> Result<FrameStats, SceneError> {
        self.expect_phase(Phase::Ready)?;

        let state = ShaderState::new(&self.textures, &self.materials);
        let mut stats = FrameStats::default();

        for object in &self.objects {
            let outcome = state.apply(&mut self.ctx, object);
            self.ctx.draw_mesh(object.mesh);

            stats.draws += 1;
            stats.missing_textures += usize::from(outcome.missing_texture);
            stats.missing_materials += usize::from(outcome.missing_material);
        }

        Ok(stats)
    }

    /// Releases the scene's GPU textures. Safe to call more than once.
    pub fn release(&mut self) {
        self.textures.release_all(&mut self.ctx);
        self.phase = Phase::Released;
    }
}

impl<G: GraphicsContext> Drop for Scene<G> {
    fn drop(&mut self) {
        self.release();
    }
}
