use std::path::PathBuf;

/// Which demo scene a pack drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    /// The rotating filmstrip with one focused cell.
    Film,
    /// The day-cycle sky with procedural grass blades.
    Grass,
}

impl std::fmt::Display for SceneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneKind::Film => f.write_str("film"),
            SceneKind::Grass => f.write_str("grass"),
        }
    }
}

/// Pixel source for one entry in a scene's texture set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// Decode an image file shipped with the pack.
    File(PathBuf),
    /// Fill the whole canvas with a single opaque colour.
    Solid([u8; 3]),
}

/// One ordered texture in a scene's set.
///
/// Order matters: the position in the set decides the registry id the
/// kernels see, so packs list textures in the order the scene consumes them.
#[derive(Debug, Clone)]
pub struct TextureSpec {
    pub name: String,
    pub source: TextureSource,
}

/// Everything the renderer needs to bring one scene up.
#[derive(Debug, Clone)]
pub struct SceneSpec {
    pub kind: SceneKind,
    /// Human-readable scene name, shown in the window title and logs.
    pub name: String,
    /// Kernel module drawn first each frame (film background, grass sky).
    pub background_kernel: PathBuf,
    /// Kernel module drawn second (film cells, grass blades).
    pub foreground_kernel: PathBuf,
    pub textures: Vec<TextureSpec>,
    /// Number of grass blades to synthesise. Ignored by film scenes.
    pub blade_count: u32,
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and tells the renderer which scene to
/// bring up, how large the preview surface should be, and how to pace the
/// redraw loop.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub scene: SceneSpec,
    /// Initial surface size in physical pixels.
    pub surface_size: (u32, u32),
    /// Frame cap for the redraw loop; None = redraw every callback.
    pub target_fps: Option<f32>,
    /// Seed for blade synthesis; None draws one from the OS.
    pub seed: Option<u64>,
    /// Render a single frame and exit instead of looping.
    pub still: bool,
}
