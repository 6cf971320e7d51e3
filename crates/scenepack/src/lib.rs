mod manifest;
mod pack;

pub use manifest::{
    parse_solid_color, KernelSection, SceneKind, SceneManifest, SceneParams, SceneSection,
    TextureEntry,
};
pub use pack::{ensure_kernel_sources, LocalPack, PackError, MANIFEST_NAME};
