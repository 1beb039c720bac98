use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single texture load. All of them are recoverable: the scene
/// keeps going without the texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("could not decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {} has {channels} channels, only RGB and RGBA are supported", .path.display())]
    UnsupportedFormat { path: PathBuf, channels: u8 },
    #[error(
        "image {} is {width}x{height}, larger than the {max}x{max} textures the device supports",
        .path.display()
    )]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error(
        "image {} decoded to {len} bytes, which does not fit {width}x{height} with {channels} channels",
        .path.display()
    )]
    MalformedPixels {
        path: PathBuf,
        width: u32,
        height: u32,
        channels: u8,
        len: usize,
    },
    #[error("texture registry is full ({capacity} textures)")]
    CapacityExceeded { capacity: usize },
    #[error("texture tag \"{0}\" is already registered")]
    DuplicateTag(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum MaterialError {
    #[error("material \"{tag}\" has invalid shininess {shininess}")]
    InvalidShininess { tag: String, shininess: f32 },
}

/// Lookup misses surfaced by the shader state setters. Nothing is uploaded
/// when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderStateError {
    #[error("no texture registered under tag \"{0}\"")]
    UnknownTexture(String),
    #[error("no material defined under tag \"{0}\"")]
    UnknownMaterial(String),
}

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("scene is in the {actual:?} phase, expected {expected:?}")]
    WrongPhase {
        expected: crate::scene::Phase,
        actual: crate::scene::Phase,
    },
    #[error("could not read scene description {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene description: {0}")]
    Description(#[from] serde_json::Error),
}

/// Failure to obtain a graphics context. This is the only fatal error.
#[derive(Error, Debug)]
pub enum GraphicsError {
    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
