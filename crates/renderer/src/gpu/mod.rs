//! GPU orchestration for the two wallpaper scenes.
//!
//! The path from a `SceneSpec` to pixels is deliberately linear:
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `textures` decodes or synthesises the scene bitmaps, builds their mip
//!   chains on the CPU, and uploads each set member under a registry id.
//! - `bindings` turns the numbered slot tables into bind group layouts and
//!   fills the slot buffers the kernels read.
//! - `programs` loads the pack's kernel modules and pairs each with the
//!   fixed depth/blend store of its draw stage.
//! - `scene` glues everything together and exposes the `SceneRenderer` API
//!   used by `window`.

pub(crate) mod bindings;
pub(crate) mod context;
pub(crate) mod programs;
pub(crate) mod scene;
pub(crate) mod textures;

pub(crate) use scene::SceneRenderer;
