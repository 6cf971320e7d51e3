use bytemuck::{Pod, Zeroable};
use rand::prelude::*;

/// Blades in the default grass field.
pub const BLADE_COUNT: u32 = 100;

/// Floats per blade record.
pub const BLADE_FLOATS: usize = 12;

/// Per-blade attributes the grass kernel animates from. Twelve floats,
/// field order fixed; generated once per scene and never regenerated.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BladeRecord {
    pub degree: f32,
    pub size: f32,
    pub xpos: f32,
    pub ypos: f32,
    pub offset: f32,
    pub scale: f32,
    pub length_x: f32,
    pub length_y: f32,
    pub hardness: f32,
    pub h: f32,
    pub s: f32,
    pub b: f32,
}

unsafe impl Zeroable for BladeRecord {}
unsafe impl Pod for BladeRecord {}

impl BladeRecord {
    /// Samples one blade. Every bounded field draws uniformly from its
    /// documented half-open range; ypos sits on the ground line at the
    /// viewport height and degree starts upright.
    pub fn sample(width: f32, height: f32, rng: &mut StdRng) -> Self {
        Self {
            degree: 0.0,
            size: rng.gen_range(4.0..8.0),
            xpos: rng.gen_range(0.0..width),
            ypos: height,
            offset: rng.gen_range(-0.1..0.1),
            scale: rng.gen_range(0.2..0.8),
            length_x: rng.gen_range(3.0..7.5),
            length_y: rng.gen_range(2.0..7.5),
            hardness: rng.gen_range(0.2..1.2),
            h: rng.gen_range(51.0..56.0) / 255.0,
            s: rng.gen_range(200.0..255.0) / 255.0,
            b: rng.gen_range(90.0..255.0) / 255.0,
        }
    }
}

/// Two-word state buffer for the grass kernel: a frame counter the kernel
/// alone advances after bind, and the fixed blade count.
#[repr(C, align(8))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameState {
    pub frame_counter: i32,
    pub blade_count: i32,
}

unsafe impl Zeroable for FrameState {}
unsafe impl Pod for FrameState {}

impl FrameState {
    pub fn new(blade_count: u32) -> Self {
        Self {
            frame_counter: 0,
            blade_count: blade_count as i32,
        }
    }
}

/// Generates the whole field. Records are uncorrelated; pass a seeded rng
/// for a reproducible field or an entropy rng for per-run variety.
pub fn generate_blades(width: f32, height: f32, count: u32, rng: &mut StdRng) -> Vec<BladeRecord> {
    (0..count)
        .map(|_| BladeRecord::sample(width, height, rng))
        .collect()
}

/// Rng for blade generation: seeded when reproducibility matters, entropy
/// otherwise.
pub fn blade_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
