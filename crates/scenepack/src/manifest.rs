//! Manifest schema for on-disk scene packs. A pack directory carries a
//! `scene.toml` naming the scene kind, the two kernel modules, and the
//! ordered texture list whose order becomes the texture registry order.
//!
//! Types:
//!
//! - `SceneManifest` is the parsed `scene.toml`: scene section, kernel
//!   paths, ordered textures, and optional tuning params.
//! - `SceneKind` selects the film or grass pipeline wiring.
//! - `TextureEntry` names one texture and points it at an image file or a
//!   solid fill color, so packs can ship without artwork.
//! - `SceneParams` holds per-kind tuning with serde defaults.
//!
//! Functions:
//!
//! - `SceneManifest::validate` returns human-readable issues so loaders can
//!   surface misconfigurations without panicking.
//! - `parse_solid_color` turns a `#RRGGBB` string into raw channels.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SceneManifest {
    pub scene: SceneSection,
    pub kernels: KernelSection,
    #[serde(default)]
    pub textures: Vec<TextureEntry>,
    #[serde(default)]
    pub params: SceneParams,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SceneSection {
    pub kind: SceneKind,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    Film,
    Grass,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KernelSection {
    pub background: PathBuf,
    pub foreground: PathBuf,
}

/// One ordered texture source: exactly one of `file` or `solid` must be
/// set, which `validate` enforces.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TextureEntry {
    pub name: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub solid: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct SceneParams {
    #[serde(default = "default_blade_count")]
    pub blade_count: u32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            blade_count: default_blade_count(),
        }
    }
}

fn default_blade_count() -> u32 {
    100
}

impl SceneManifest {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.textures.is_empty() {
            issues.push("manifest must declare at least one texture".to_string());
        }
        for entry in &self.textures {
            match (&entry.file, &entry.solid) {
                (Some(_), Some(_)) => issues.push(format!(
                    "texture '{}' sets both 'file' and 'solid'",
                    entry.name
                )),
                (None, None) => issues.push(format!(
                    "texture '{}' needs either 'file' or 'solid'",
                    entry.name
                )),
                (None, Some(color)) => {
                    if let Err(err) = parse_solid_color(color) {
                        issues.push(format!("texture '{}': {}", entry.name, err));
                    }
                }
                (Some(_), None) => {}
            }
        }
        for (index, entry) in self.textures.iter().enumerate() {
            if self.textures[..index].iter().any(|e| e.name == entry.name) {
                issues.push(format!("duplicate texture name '{}'", entry.name));
            }
        }
        if self.scene.kind == SceneKind::Grass && self.params.blade_count == 0 {
            issues.push("grass scene needs a non-zero blade_count".to_string());
        }
        issues
    }
}

/// Parses a `#RRGGBB` fill color into its raw channels.
pub fn parse_solid_color(value: &str) -> Result<[u8; 3], String> {
    let hex = value
        .strip_prefix('#')
        .ok_or_else(|| format!("solid color '{value}' must start with '#'"))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("solid color '{value}' must be #RRGGBB"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|e| e.to_string())
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film_manifest() -> SceneManifest {
        SceneManifest {
            scene: SceneSection {
                kind: SceneKind::Film,
                name: Some("Film".into()),
            },
            kernels: KernelSection {
                background: PathBuf::from("kernels/background.wgsl"),
                foreground: PathBuf::from("kernels/cells.wgsl"),
            },
            textures: vec![TextureEntry {
                name: "p01".into(),
                file: None,
                solid: Some("#204060".into()),
            }],
            params: SceneParams::default(),
        }
    }

    #[test]
    fn parses_minimal_film_manifest() {
        let manifest: SceneManifest = toml::from_str(
            r##"
            [scene]
            kind = "film"

            [kernels]
            background = "kernels/background.wgsl"
            foreground = "kernels/cells.wgsl"

            [[textures]]
            name = "p01"
            solid = "#204060"
            "##,
        )
        .expect("parse manifest");
        assert_eq!(manifest.scene.kind, SceneKind::Film);
        assert_eq!(manifest.params.blade_count, 100);
        assert!(manifest.validate().is_empty());
    }

    #[test]
    fn texture_order_follows_the_manifest() {
        let manifest: SceneManifest = toml::from_str(
            r##"
            [scene]
            kind = "grass"

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
            "##,
        )
        .expect("parse manifest");
        let names: Vec<_> = manifest.textures.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["night", "sunrise", "sky", "sunset"]);
        assert!(manifest.validate().is_empty());
    }

    #[test]
    fn rejects_texture_without_source() {
        let mut manifest = film_manifest();
        manifest.textures[0].solid = None;
        let issues = manifest.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("either 'file' or 'solid'"));
    }

    #[test]
    fn rejects_texture_with_both_sources() {
        let mut manifest = film_manifest();
        manifest.textures[0].file = Some(PathBuf::from("textures/p01.png"));
        let issues = manifest.validate();
        assert!(issues[0].contains("both 'file' and 'solid'"));
    }

    #[test]
    fn rejects_malformed_fill_colors() {
        assert!(parse_solid_color("#12345").is_err());
        assert!(parse_solid_color("123456").is_err());
        assert!(parse_solid_color("#12g456").is_err());
        assert_eq!(parse_solid_color("#0B1026"), Ok([0x0b, 0x10, 0x26]));
    }

    #[test]
    fn rejects_duplicate_texture_names() {
        let mut manifest = film_manifest();
        manifest.textures.push(manifest.textures[0].clone());
        let issues = manifest.validate();
        assert!(issues.iter().any(|i| i.contains("duplicate texture name")));
    }

    #[test]
    fn rejects_empty_grass_field() {
        let mut manifest = film_manifest();
        manifest.scene.kind = SceneKind::Grass;
        manifest.params.blade_count = 0;
        let issues = manifest.validate();
        assert!(issues.iter().any(|i| i.contains("blade_count")));
    }
}
