//! Wraps a scene pack directory: loads and validates `scene.toml`, resolves
//! asset paths against the pack root, and confirms the kernel modules exist
//! before any GPU work starts, so later pipeline errors point at kernel
//! code rather than missing files.
//!
//! Types:
//!
//! - `PackError` classifies manifest discovery, parse, validation, and I/O
//!   failures for error reporting in the binary.
//! - `LocalPack` stores the resolved root directory and parsed
//!   `SceneManifest` for the renderer wiring to traverse.
//!
//! Functions:
//!
//! - `LocalPack::load` reads `scene.toml`, validates it, and returns a
//!   filesystem-backed handle.
//! - `LocalPack::kernel_paths` and `asset_path` resolve pack-relative
//!   files.
//! - `ensure_kernel_sources` confirms both kernel modules are on disk.
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::manifest::SceneManifest;

pub const MANIFEST_NAME: &str = "scene.toml";

#[derive(Debug, Error)]
pub enum PackError {
    #[error("scene manifest not found at {0}")]
    ManifestMissing(PathBuf),

    #[error("failed to parse scene manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),

    #[error("scene manifest validation failed: {0:?}")]
    ManifestValidation(Vec<String>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct LocalPack {
    root: PathBuf,
    manifest: SceneManifest,
}

impl LocalPack {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, PackError> {
        let root = root.as_ref().to_path_buf();
        let manifest_path = root.join(MANIFEST_NAME);
        if !manifest_path.exists() {
            return Err(PackError::ManifestMissing(manifest_path));
        }

        let manifest_raw = fs::read_to_string(&manifest_path)?;
        let manifest: SceneManifest = toml::from_str(&manifest_raw)?;
        let issues = manifest.validate();
        if !issues.is_empty() {
            return Err(PackError::ManifestValidation(issues));
        }

        tracing::debug!(
            root = %root.display(),
            kind = ?manifest.scene.kind,
            textures = manifest.textures.len(),
            "loaded scene pack"
        );
        Ok(Self { root, manifest })
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn manifest(&self) -> &SceneManifest {
        &self.manifest
    }

    pub fn asset_path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Resolved (background, foreground) kernel module paths.
    pub fn kernel_paths(&self) -> (PathBuf, PathBuf) {
        (
            self.root.join(&self.manifest.kernels.background),
            self.root.join(&self.manifest.kernels.foreground),
        )
    }
}

/// Confirms both kernel modules exist, returning their resolved paths.
pub fn ensure_kernel_sources(pack: &LocalPack) -> Result<(PathBuf, PathBuf), PackError> {
    let (background, foreground) = pack.kernel_paths();
    let mut missing = Vec::new();
    for path in [&background, &foreground] {
        if !path.exists() {
            missing.push(format!("missing kernel source: {}", path.display()));
        }
    }
    if !missing.is_empty() {
        return Err(PackError::ManifestValidation(missing));
    }
    Ok((background, foreground))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRASS_MANIFEST: &str = r##"
        [scene]
        kind = "grass"
        name = "Grass"

        [kernels]
        background = "kernels/sky.wgsl"
        foreground = "kernels/blades.wgsl"

        [[textures]]
        name = "night"
        solid = "#0b1026"

        [[textures]]
        name = "sunrise"
        solid = "#e08040"

        [[textures]]
        name = "sky"
        solid = "#70a0e0"

        [[textures]]
        name = "sunset"
        solid = "#c04020"
    "##;

    fn write_pack(dir: &Path, manifest: &str, extra_files: &[(&str, &str)]) {
        fs::write(dir.join(MANIFEST_NAME), manifest).expect("write manifest");
        for (path, contents) in extra_files {
            let full_path = dir.join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).expect("create dirs");
            }
            fs::write(full_path, contents).expect("write file");
        }
    }

    #[test]
    fn loads_valid_pack() {
        let temp = tempfile::tempdir().unwrap();
        write_pack(
            temp.path(),
            GRASS_MANIFEST,
            &[
                ("kernels/sky.wgsl", "// kernel"),
                ("kernels/blades.wgsl", "// kernel"),
            ],
        );

        let pack = LocalPack::load(temp.path()).expect("load pack");
        assert_eq!(pack.manifest().textures.len(), 4);
        let (background, foreground) = ensure_kernel_sources(&pack).expect("kernels exist");
        assert!(background.exists());
        assert!(foreground.exists());
    }

    #[test]
    fn missing_manifest_is_a_typed_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = LocalPack::load(temp.path()).unwrap_err();
        assert!(matches!(err, PackError::ManifestMissing(_)));
    }

    #[test]
    fn detects_missing_kernel_source() {
        let temp = tempfile::tempdir().unwrap();
        write_pack(temp.path(), GRASS_MANIFEST, &[("kernels/sky.wgsl", "//")]);

        let pack = LocalPack::load(temp.path()).expect("load pack");
        let err = ensure_kernel_sources(&pack).unwrap_err();
        assert!(matches!(err, PackError::ManifestValidation(_)));
    }

    #[test]
    fn invalid_manifest_reports_issues() {
        let temp = tempfile::tempdir().unwrap();
        write_pack(
            temp.path(),
            r#"
            [scene]
            kind = "film"

            [kernels]
            background = "kernels/background.wgsl"
            foreground = "kernels/cells.wgsl"
            "#,
            &[],
        );

        let err = LocalPack::load(temp.path()).unwrap_err();
        match err {
            PackError::ManifestValidation(issues) => {
                assert!(issues.iter().any(|i| i.contains("at least one texture")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn asset_paths_resolve_under_the_root() {
        let temp = tempfile::tempdir().unwrap();
        write_pack(
            temp.path(),
            GRASS_MANIFEST,
            &[
                ("kernels/sky.wgsl", "//"),
                ("kernels/blades.wgsl", "//"),
            ],
        );
        let pack = LocalPack::load(temp.path()).expect("load pack");
        let resolved = pack.asset_path(Path::new("textures/night.png"));
        assert!(resolved.starts_with(temp.path()));
    }
}
