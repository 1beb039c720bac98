pub mod context;
pub mod decode;
pub mod error;
pub mod gpu;
pub mod light;
pub mod material;
pub mod registry;
pub mod scene;
pub mod shader_state;
pub mod texture;
pub mod transform;
pub mod uniform;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

const DEFAULT_SCENE: &str = "demos/breakfast.json";

/// Prepares the scene described by the file given as the first argument and
/// renders a single frame into a headless context.
pub fn run() -> anyhow::Result<()> {
    env_logger::builder()
        .parse_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENE));

    let description = scene::SceneDescription::from_path(&path)?;
    log::info!(
        "Loaded {} with {} objects",
        path.display(),
        description.objects.len()
    );

    let ctx = pollster::block_on(context::WgpuContext::new_headless())?;
    let mut scene = scene::Scene::new(ctx);

    scene.prepare(&decode::ImageCrateDecoder, &description)?;
    let stats = scene.render_frame()?;
    let recording = scene.context_mut().finish_frame();

    log::info!(
        "Rendered {} draws ({} untextured fallbacks, {} without material), {} uniform bytes",
        stats.draws,
        stats.missing_textures,
        stats.missing_materials,
        recording.uniform_bytes
    );

    scene.release();

    Ok(())
}
