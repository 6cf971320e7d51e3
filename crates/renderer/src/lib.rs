//! Renderer crate for the wallscene demos.
//!
//! The crate glues the preview window, the `wgpu` pipelines, and the numbered
//! slot contract from `scenestate` together. The overall flow is:
//!
//! ```text
//!   CLI / wallscene
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ SceneRenderer ──▶ winit event loop ──▶ render_frame()
//!          ▲              │ setup: textures → state → bindings → pipelines
//!          │              └─▶ set_film_strip_position() ─▶ pose uniform
//! ```
//!
//! `SceneRenderer` owns all GPU resources (surface, device, pipelines, slot
//! buffers) and runs every setup stage exactly once; after that, frames only
//! replay the fixed draw choreography. The kernel modules shipped in a pack
//! are opaque here: the renderer hands them the documented bindings and never
//! inspects what they compute.

mod gpu;
mod types;
mod window;

pub use types::{RendererConfig, SceneKind, SceneSpec, TextureSource, TextureSpec};

use anyhow::Result;

/// Thin entry point owning the immutable renderer configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Brings the scene up and drives the preview until the window closes.
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            scene = %self.config.scene.kind,
            name = %self.config.scene.name,
            width = self.config.surface_size.0,
            height = self.config.surface_size.1,
            "starting preview"
        );
        window::run_preview(&self.config)
    }
}
