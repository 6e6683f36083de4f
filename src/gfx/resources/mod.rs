// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Texture helpers shared by the render engine and simulation renderers.

pub mod texture_resource;

// Re-export main types
pub use texture_resource::TextureResource;
