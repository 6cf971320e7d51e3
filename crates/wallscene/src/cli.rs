use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "wallscene",
    author,
    version,
    about = "Scene wallpaper previewer",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Scene pack directory containing `scene.toml` (e.g. `packs/film`).
    #[arg(value_name = "PACK_DIR")]
    pub pack: PathBuf,

    /// Preview surface resolution (e.g. `320x480`).
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        value_parser = parse_surface_size,
        default_value = "320x480"
    )]
    pub size: (u32, u32),

    /// Optional FPS cap for the preview loop (0=uncapped).
    #[arg(long, value_name = "FPS", default_value_t = 60.0)]
    pub fps: f32,

    /// Seed for the procedural blade field; omit for a fresh field each run.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Render a single frame and exit instead of animating continuously.
    #[arg(long)]
    pub still: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("surface size must not be empty".to_string());
    }

    let (w, h) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_surface_size_variants() {
        assert_eq!(parse_surface_size("320x480").unwrap(), (320, 480));
        assert_eq!(parse_surface_size("1920X1080").unwrap(), (1920, 1080));
        assert_eq!(parse_surface_size(" 640 x 360 ").unwrap(), (640, 360));
        assert!(parse_surface_size("640").is_err());
        assert!(parse_surface_size("0x480").is_err());
        assert!(parse_surface_size("ax480").is_err());
        assert!(parse_surface_size("").is_err());
    }

    #[test]
    fn defaults_match_the_demo_surface() {
        let cli = Cli::parse_from(["wallscene", "packs/film"]);
        assert_eq!(cli.pack, PathBuf::from("packs/film"));
        assert_eq!(cli.size, (320, 480));
        assert_eq!(cli.fps, 60.0);
        assert_eq!(cli.seed, None);
        assert!(!cli.still);
    }

    #[test]
    fn accepts_overrides() {
        let cli = Cli::parse_from([
            "wallscene",
            "packs/grass",
            "--size",
            "800x600",
            "--fps",
            "0",
            "--seed",
            "7",
            "--still",
        ]);
        assert_eq!(cli.size, (800, 600));
        assert_eq!(cli.fps, 0.0);
        assert_eq!(cli.seed, Some(7));
        assert!(cli.still);
    }
}
