use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use renderer::{Renderer, RendererConfig, SceneKind, SceneSpec, TextureSource, TextureSpec};
use scenepack::{ensure_kernel_sources, parse_solid_color, LocalPack, TextureEntry};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let pack = LocalPack::load(&cli.pack)
        .with_context(|| format!("failed to load scene pack at {}", cli.pack.display()))?;
    let (background_kernel, foreground_kernel) =
        ensure_kernel_sources(&pack).context("scene pack kernels are incomplete")?;
    let scene = build_scene_spec(&pack, background_kernel, foreground_kernel)?;

    tracing::info!(
        pack = %pack.root().display(),
        scene = %scene.kind,
        name = %scene.name,
        textures = scene.textures.len(),
        "scene pack loaded"
    );

    let config = RendererConfig {
        scene,
        surface_size: cli.size,
        target_fps: (cli.fps > 0.0).then_some(cli.fps),
        seed: cli.seed,
        still: cli.still,
    };
    Renderer::new(config).run()
}

fn build_scene_spec(
    pack: &LocalPack,
    background_kernel: PathBuf,
    foreground_kernel: PathBuf,
) -> Result<SceneSpec> {
    let manifest = pack.manifest();
    let kind = match manifest.scene.kind {
        scenepack::SceneKind::Film => SceneKind::Film,
        scenepack::SceneKind::Grass => SceneKind::Grass,
    };
    let name = manifest
        .scene
        .name
        .clone()
        .unwrap_or_else(|| kind.to_string());
    let textures = manifest
        .textures
        .iter()
        .map(|entry| texture_spec(pack, entry))
        .collect::<Result<Vec<_>>>()?;

    Ok(SceneSpec {
        kind,
        name,
        background_kernel,
        foreground_kernel,
        textures,
        blade_count: manifest.params.blade_count,
    })
}

fn texture_spec(pack: &LocalPack, entry: &TextureEntry) -> Result<TextureSpec> {
    let source = match (&entry.file, &entry.solid) {
        (Some(file), None) => TextureSource::File(pack.asset_path(file)),
        (None, Some(color)) => {
            let rgb = parse_solid_color(color)
                .map_err(|err| anyhow!("texture '{}': {err}", entry.name))?;
            TextureSource::Solid(rgb)
        }
        // LocalPack::load already rejected manifests that reach here.
        _ => bail!(
            "texture '{}' must set exactly one of 'file' or 'solid'",
            entry.name
        ),
    };
    Ok(TextureSpec {
        name: entry.name.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const GRASS_MANIFEST: &str = r##"
        [scene]
        kind = "grass"
        name = "Meadow"

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

    fn write_pack(dir: &Path, manifest: &str) {
        fs::write(dir.join(scenepack::MANIFEST_NAME), manifest).expect("write manifest");
        fs::create_dir_all(dir.join("kernels")).expect("create kernels dir");
        for kernel in ["sky.wgsl", "blades.wgsl", "background.wgsl", "cells.wgsl"] {
            fs::write(dir.join("kernels").join(kernel), "// kernel").expect("write kernel");
        }
    }

    fn spec_for(dir: &Path) -> SceneSpec {
        let pack = LocalPack::load(dir).expect("load pack");
        let (background, foreground) = ensure_kernel_sources(&pack).expect("kernels exist");
        build_scene_spec(&pack, background, foreground).expect("build spec")
    }

    #[test]
    fn builds_a_grass_spec_from_a_pack() {
        let temp = tempfile::tempdir().unwrap();
        write_pack(temp.path(), GRASS_MANIFEST);

        let scene = spec_for(temp.path());
        assert_eq!(scene.kind, SceneKind::Grass);
        assert_eq!(scene.name, "Meadow");
        assert_eq!(scene.blade_count, 100);
        assert!(scene.background_kernel.ends_with("kernels/sky.wgsl"));
        assert!(scene.foreground_kernel.ends_with("kernels/blades.wgsl"));

        let names: Vec<_> = scene.textures.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["night", "sunrise", "sky", "sunset"]);
        assert_eq!(
            scene.textures[0].source,
            TextureSource::Solid([0x0b, 0x10, 0x26])
        );
    }

    #[test]
    fn scene_name_falls_back_to_the_kind() {
        let temp = tempfile::tempdir().unwrap();
        write_pack(
            temp.path(),
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
        );

        let scene = spec_for(temp.path());
        assert_eq!(scene.kind, SceneKind::Film);
        assert_eq!(scene.name, "film");
    }

    #[test]
    fn file_textures_resolve_under_the_pack_root() {
        let temp = tempfile::tempdir().unwrap();
        write_pack(
            temp.path(),
            r#"
            [scene]
            kind = "film"

            [kernels]
            background = "kernels/background.wgsl"
            foreground = "kernels/cells.wgsl"

            [[textures]]
            name = "p01"
            file = "textures/p01.png"
            "#,
        );

        let scene = spec_for(temp.path());
        match &scene.textures[0].source {
            TextureSource::File(path) => assert!(path.starts_with(temp.path())),
            other => panic!("expected a file source, got {other:?}"),
        }
    }
}
