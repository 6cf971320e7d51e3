//! Bitmap decoding and GPU upload for a scene's texture set.
//!
//! Film cells go through the boxed path: the image lands in a power-of-two
//! square, gets a full mip chain computed on the CPU, and every level large
//! enough to hold one has a two-pixel transparent ring cleared around it.
//! The strip's sampler clamps U but repeats V, so without the ring a linear
//! fetch at a cell seam would bleed the opposite edge of the strip into the
//! frame. Grass layers skip all of that and upload at their native size with
//! a single level.

use anyhow::{Context as AnyhowContext, Result};
use wgpu::util::DeviceExt;

use crate::types::{SceneKind, TextureSource, TextureSpec};

/// Side length used when a solid-colour film cell is synthesised.
const FILM_SOLID_EXTENT: u32 = 512;
/// Side length used when a solid-colour grass layer is synthesised.
const GRASS_SOLID_EXTENT: u32 = 64;
/// Width of the transparent ring cleared around boxed mip levels.
const BORDER_WIDTH: u32 = 2;

/// Decoded RGBA pixels plus their extent, before any boxing.
struct CpuImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// One uploaded member of a scene's texture set.
pub(crate) struct SceneTexture {
    pub name: String,
    /// Opaque id the kernels use to refer to this texture. Never zero.
    pub registry_id: u32,
    pub view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

/// The scene's ordered texture set. Set order equals pack order, which in
/// turn fixes the registry ids the kernels read from their id slot.
pub(crate) struct TextureSet {
    pub textures: Vec<SceneTexture>,
}

impl TextureSet {
    pub(crate) fn len(&self) -> usize {
        self.textures.len()
    }

    pub(crate) fn registry_ids(&self) -> Vec<u32> {
        self.textures.iter().map(|entry| entry.registry_id).collect()
    }
}

/// Decodes, prepares, and uploads every texture a scene asked for.
pub(crate) fn load_texture_set(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    kind: SceneKind,
    specs: &[TextureSpec],
) -> Result<TextureSet> {
    let ids = assign_registry_ids(specs.len());
    let mut textures = Vec::with_capacity(specs.len());
    for (spec, registry_id) in specs.iter().zip(ids) {
        let image = decode_source(&spec.source, kind)?;
        let texture = match kind {
            SceneKind::Film => upload_boxed(device, queue, &spec.name, &image),
            SceneKind::Grass => upload_native(device, queue, &spec.name, &image),
        };
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        tracing::debug!(
            name = %spec.name,
            registry_id,
            width = image.width,
            height = image.height,
            "uploaded scene texture"
        );
        textures.push(SceneTexture {
            name: spec.name.clone(),
            registry_id,
            view,
            _texture: texture,
        });
    }
    tracing::info!(count = textures.len(), scene = %kind, "texture set ready");
    Ok(TextureSet { textures })
}

/// Ids handed to the kernels. Zero is reserved for "no texture", so the
/// first set member gets id 1 and the rest follow in pack order.
fn assign_registry_ids(count: usize) -> Vec<u32> {
    (1..=count as u32).collect()
}

fn decode_source(source: &TextureSource, kind: SceneKind) -> Result<CpuImage> {
    match source {
        TextureSource::File(path) => {
            let image = image::open(path)
                .with_context(|| format!("failed to open texture image {}", path.display()))?;
            let rgba = image.to_rgba8();
            Ok(CpuImage {
                width: rgba.width(),
                height: rgba.height(),
                pixels: rgba.into_raw(),
            })
        }
        TextureSource::Solid(color) => {
            let extent = match kind {
                SceneKind::Film => FILM_SOLID_EXTENT,
                SceneKind::Grass => GRASS_SOLID_EXTENT,
            };
            Ok(CpuImage {
                width: extent,
                height: extent,
                pixels: solid_pixels(*color, extent, extent),
            })
        }
    }
}

fn solid_pixels(color: [u8; 3], width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        pixels.extend_from_slice(&[color[0], color[1], color[2], 0xff]);
    }
    pixels
}

/// Copies `image` into the top-left corner of a power-of-two square canvas.
/// The canvas starts fully transparent, so padding never contributes colour.
fn box_into_square(image: &CpuImage) -> (Vec<u8>, u32) {
    let side = image.width.max(image.height).max(1).next_power_of_two();
    let mut canvas = vec![0u8; (side * side * 4) as usize];
    let row_bytes = (image.width * 4) as usize;
    for row in 0..image.height {
        let src = (row * image.width * 4) as usize;
        let dst = (row * side * 4) as usize;
        canvas[dst..dst + row_bytes].copy_from_slice(&image.pixels[src..src + row_bytes]);
    }
    (canvas, side)
}

/// Side lengths of every mip level for a square base, largest first down to 1.
fn mip_level_sizes(base: u32) -> Vec<u32> {
    let mut sizes = Vec::new();
    let mut size = base.max(1);
    loop {
        sizes.push(size);
        if size == 1 {
            break;
        }
        size /= 2;
    }
    sizes
}

/// 2x2 box filter: `parent` is a `size * 2` square, the result is `size`.
fn downsample(parent: &[u8], size: u32) -> Vec<u8> {
    let parent_side = size * 2;
    let mut level = vec![0u8; (size * size * 4) as usize];
    for y in 0..size {
        for x in 0..size {
            for channel in 0..4 {
                let mut sum = 0u32;
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    let px = x * 2 + dx;
                    let py = y * 2 + dy;
                    sum += u32::from(parent[((py * parent_side + px) * 4 + channel) as usize]);
                }
                level[((y * size + x) * 4 + channel) as usize] = (sum / 4) as u8;
            }
        }
    }
    level
}

/// One axis-aligned rectangle of a mip level that gets cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BorderStrip {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// The four strips forming the ring: left, right, top, bottom.
fn border_strips(size: u32) -> [BorderStrip; 4] {
    [
        BorderStrip {
            x: 0,
            y: 0,
            width: BORDER_WIDTH,
            height: size,
        },
        BorderStrip {
            x: size - BORDER_WIDTH,
            y: 0,
            width: BORDER_WIDTH,
            height: size,
        },
        BorderStrip {
            x: 0,
            y: 0,
            width: size,
            height: BORDER_WIDTH,
        },
        BorderStrip {
            x: 0,
            y: size - BORDER_WIDTH,
            width: size,
            height: BORDER_WIDTH,
        },
    ]
}

/// Zeroes the ring on one level. Callers skip levels smaller than the ring.
fn clear_border_ring(pixels: &mut [u8], size: u32) {
    for strip in border_strips(size) {
        for y in strip.y..strip.y + strip.height {
            for x in strip.x..strip.x + strip.width {
                let at = ((y * size + x) * 4) as usize;
                pixels[at..at + 4].fill(0);
            }
        }
    }
}

/// Boxed upload path used by film cells: square the image, build the whole
/// mip chain on the CPU, clear the border ring on every level that can hold
/// one, then hand the concatenated levels to the device in a single call.
fn upload_boxed(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &CpuImage,
) -> wgpu::Texture {
    let (canvas, side) = box_into_square(image);
    let sizes = mip_level_sizes(side);

    let mut levels = Vec::with_capacity(sizes.len());
    levels.push(canvas);
    for (index, &size) in sizes.iter().enumerate().skip(1) {
        let next = downsample(&levels[index - 1], size);
        levels.push(next);
    }
    // Rings are cleared after the chain is complete so a cleared parent never
    // darkens the interior of the next level down.
    for (&size, level) in sizes.iter().zip(levels.iter_mut()) {
        if size >= BORDER_WIDTH {
            clear_border_ring(level, size);
        }
    }

    let total: usize = levels.iter().map(Vec::len).sum();
    let mut data = Vec::with_capacity(total);
    for level in &levels {
        data.extend_from_slice(level);
    }

    device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: side,
                height: side,
                depth_or_array_layers: 1,
            },
            mip_level_count: sizes.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &data,
    )
}

/// Native upload path used by grass layers: original extent, one level.
fn upload_native(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &CpuImage,
) -> wgpu::Texture {
    device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_level_sizes_halve_down_to_one() {
        let sizes = mip_level_sizes(512);
        assert_eq!(sizes, vec![512, 256, 128, 64, 32, 16, 8, 4, 2, 1]);
    }

    #[test]
    fn nine_levels_of_a_boxed_cell_receive_a_ring() {
        let cleared = mip_level_sizes(512)
            .into_iter()
            .filter(|&size| size >= BORDER_WIDTH)
            .count();
        assert_eq!(cleared, 9);
    }

    #[test]
    fn border_strips_cover_the_four_edges() {
        let strips = border_strips(8);
        assert_eq!(
            strips[0],
            BorderStrip {
                x: 0,
                y: 0,
                width: 2,
                height: 8
            }
        );
        assert_eq!(
            strips[1],
            BorderStrip {
                x: 6,
                y: 0,
                width: 2,
                height: 8
            }
        );
        assert_eq!(
            strips[2],
            BorderStrip {
                x: 0,
                y: 0,
                width: 8,
                height: 2
            }
        );
        assert_eq!(
            strips[3],
            BorderStrip {
                x: 0,
                y: 6,
                width: 8,
                height: 2
            }
        );
    }

    #[test]
    fn clear_border_ring_leaves_the_interior_alone() {
        let size = 8u32;
        let mut pixels = vec![0xffu8; (size * size * 4) as usize];
        clear_border_ring(&mut pixels, size);

        for y in 0..size {
            for x in 0..size {
                let at = ((y * size + x) * 4) as usize;
                let on_ring = x < 2 || x >= size - 2 || y < 2 || y >= size - 2;
                let value = if on_ring { 0x00 } else { 0xff };
                assert_eq!(pixels[at], value, "pixel ({x},{y})");
                assert_eq!(pixels[at + 3], value, "alpha ({x},{y})");
            }
        }
    }

    #[test]
    fn downsample_averages_each_quad() {
        // One 2x2 parent: four grey levels averaging to 96 in every channel.
        let parent: Vec<u8> = [0u8, 64, 128, 192]
            .into_iter()
            .flat_map(|value| [value; 4])
            .collect();
        let level = downsample(&parent, 1);
        assert_eq!(level, vec![96; 4]);
    }

    #[test]
    fn boxing_pads_with_transparent_black() {
        let image = CpuImage {
            width: 3,
            height: 2,
            pixels: vec![0xaa; 3 * 2 * 4],
        };
        let (canvas, side) = box_into_square(&image);
        assert_eq!(side, 4);
        // Copied texel.
        assert_eq!(&canvas[0..4], &[0xaa; 4]);
        // Padding texel to the right of the last source column.
        let at = (3 * 4) as usize;
        assert_eq!(&canvas[at..at + 4], &[0x00; 4]);
        // Padding row below the source rows.
        let at = (2 * 4 * 4) as usize;
        assert_eq!(&canvas[at..at + 4], &[0x00; 4]);
    }

    #[test]
    fn registry_ids_start_at_one_and_follow_pack_order() {
        let ids = assign_registry_ids(13);
        assert_eq!(ids.len(), 13);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&13));
        assert!(ids.iter().all(|&id| id != 0));
    }

    #[test]
    fn solid_fill_is_opaque() {
        let pixels = solid_pixels([0x10, 0x20, 0x30], 2, 2);
        assert_eq!(pixels.len(), 16);
        assert_eq!(&pixels[0..4], &[0x10, 0x20, 0x30, 0xff]);
    }
}
