//! Slot buffers and bind groups realising the kernel binding contract.
//!
//! Bind group 0 carries the numbered slots from `scenestate::slots`; the
//! layout entries below are listed in slot-table order so the contract and
//! the GPU layout cannot drift apart silently. Bind group 1 carries texture
//! set members as view/sampler pairs at bindings `2i` and `2i + 1`: the film
//! group holds a single pair and is rebound per cell, the grass group holds
//! all four sky layers at once.

use wgpu::util::DeviceExt;

use scenestate::slots::{
    FILM_SLOT_MATRICES, FILM_SLOT_POSE, FILM_SLOT_STRIP_STATE, FILM_SLOT_TEXTURE_IDS,
    FILM_SLOT_TEXTURE_OFFSETS, FILM_SLOT_TRIANGLE_OFFSETS, GRASS_SLOT_BLADES,
    GRASS_SLOT_FRAME_STATE, GRASS_SLOT_MATRICES, GRASS_SLOT_TEXTURE_IDS,
};
use scenestate::{BladeRecord, FilmPose, FrameState, MatrixBlock, StripGeometry};

use crate::gpu::textures::TextureSet;

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    read_only: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// Film bind group 0, one entry per slot-table row.
///
/// `strip_state` is the single writable slot and only in the fragment
/// stage, which is where storage writes are allowed everywhere wgpu runs.
fn film_slot_entries() -> Vec<wgpu::BindGroupLayoutEntry> {
    vec![
        storage_entry(
            FILM_SLOT_TEXTURE_IDS,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            true,
        ),
        uniform_entry(FILM_SLOT_POSE, wgpu::ShaderStages::VERTEX_FRAGMENT),
        storage_entry(FILM_SLOT_STRIP_STATE, wgpu::ShaderStages::FRAGMENT, false),
        uniform_entry(FILM_SLOT_MATRICES, wgpu::ShaderStages::VERTEX),
        storage_entry(FILM_SLOT_TRIANGLE_OFFSETS, wgpu::ShaderStages::VERTEX, true),
        storage_entry(FILM_SLOT_TEXTURE_OFFSETS, wgpu::ShaderStages::VERTEX, true),
    ]
}

/// Grass bind group 0 as the sky stage sees it: the frame counter is
/// writable so the kernel can advance it, the id table is read-only.
fn grass_sky_entries() -> Vec<wgpu::BindGroupLayoutEntry> {
    vec![
        storage_entry(GRASS_SLOT_FRAME_STATE, wgpu::ShaderStages::FRAGMENT, false),
        storage_entry(GRASS_SLOT_TEXTURE_IDS, wgpu::ShaderStages::FRAGMENT, true),
    ]
}

/// Grass bind group 0 as the blade stage sees it: every slot read-only,
/// frame state now visible to the vertex stage that sways the blades.
fn grass_blade_entries() -> Vec<wgpu::BindGroupLayoutEntry> {
    vec![
        storage_entry(
            GRASS_SLOT_FRAME_STATE,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            true,
        ),
        storage_entry(GRASS_SLOT_TEXTURE_IDS, wgpu::ShaderStages::FRAGMENT, true),
        storage_entry(GRASS_SLOT_BLADES, wgpu::ShaderStages::VERTEX_FRAGMENT, true),
        uniform_entry(GRASS_SLOT_MATRICES, wgpu::ShaderStages::VERTEX),
    ]
}

/// Texture set entries for bind group 1: pair `i` sits at bindings `2i`
/// (view) and `2i + 1` (sampler).
fn texture_pair_entries(pairs: u32) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = Vec::with_capacity((pairs * 2) as usize);
    for pair in 0..pairs {
        entries.push(texture_entry(pair * 2));
        entries.push(sampler_entry(pair * 2 + 1));
    }
    entries
}

/// Everything the film draws bind: the slot group shared by both stages
/// and one single-pair texture group per cell.
pub(crate) struct FilmBindings {
    pub slot_layout: wgpu::BindGroupLayout,
    pub slot_group: wgpu::BindGroup,
    pub texture_layout: wgpu::BindGroupLayout,
    pub texture_groups: Vec<wgpu::BindGroup>,
    pub pose_buffer: wgpu::Buffer,
    pub matrix_buffer: wgpu::Buffer,
    _id_buffer: wgpu::Buffer,
    _state_buffer: wgpu::Buffer,
    _triangle_offset_buffer: wgpu::Buffer,
    _texture_offset_buffer: wgpu::Buffer,
}

impl FilmBindings {
    pub(crate) fn new(
        device: &wgpu::Device,
        geometry: &StripGeometry,
        textures: &TextureSet,
        matrices: &MatrixBlock,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let ids = textures.registry_ids();
        let id_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("film texture ids"),
            contents: bytemuck::cast_slice(&ids),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let pose_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("film pose"),
            contents: bytemuck::bytes_of(&FilmPose::initial()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        // Written once at creation; after bind the kernel owns it.
        let state_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("film strip state"),
            contents: bytemuck::bytes_of(&geometry.strip_state()),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let matrix_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("film matrices"),
            contents: bytemuck::bytes_of(matrices),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let triangle_offset_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("film triangle offsets"),
            contents: bytemuck::cast_slice(&geometry.triangle_offsets),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let texture_offset_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("film texture offsets"),
            contents: bytemuck::cast_slice(&geometry.texture_offsets),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let slot_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("film slots"),
            entries: &film_slot_entries(),
        });
        let slot_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("film slots"),
            layout: &slot_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: FILM_SLOT_TEXTURE_IDS,
                    resource: id_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: FILM_SLOT_POSE,
                    resource: pose_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: FILM_SLOT_STRIP_STATE,
                    resource: state_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: FILM_SLOT_MATRICES,
                    resource: matrix_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: FILM_SLOT_TRIANGLE_OFFSETS,
                    resource: triangle_offset_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: FILM_SLOT_TEXTURE_OFFSETS,
                    resource: texture_offset_buffer.as_entire_binding(),
                },
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("film cell texture"),
            entries: &texture_pair_entries(1),
        });
        let texture_groups = textures
            .textures
            .iter()
            .map(|entry| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&entry.name),
                    layout: &texture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&entry.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(sampler),
                        },
                    ],
                })
            })
            .collect();

        Self {
            slot_layout,
            slot_group,
            texture_layout,
            texture_groups,
            pose_buffer,
            matrix_buffer,
            _id_buffer: id_buffer,
            _state_buffer: state_buffer,
            _triangle_offset_buffer: triangle_offset_buffer,
            _texture_offset_buffer: texture_offset_buffer,
        }
    }
}

/// Everything the grass draws bind. The sky and blade stages share the
/// same slot buffers but see them through different layouts: the sky gets
/// the frame counter writable, the blades get it read-only a pass later.
pub(crate) struct GrassBindings {
    pub sky_layout: wgpu::BindGroupLayout,
    pub sky_group: wgpu::BindGroup,
    pub blades_layout: wgpu::BindGroupLayout,
    pub blades_group: wgpu::BindGroup,
    pub texture_layout: wgpu::BindGroupLayout,
    pub texture_group: wgpu::BindGroup,
    pub matrix_buffer: wgpu::Buffer,
    _frame_state_buffer: wgpu::Buffer,
    _id_buffer: wgpu::Buffer,
    _blade_buffer: wgpu::Buffer,
}

impl GrassBindings {
    pub(crate) fn new(
        device: &wgpu::Device,
        blades: &[BladeRecord],
        textures: &TextureSet,
        matrices: &MatrixBlock,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let ids = textures.registry_ids();
        let frame_state_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass frame state"),
            contents: bytemuck::bytes_of(&FrameState::new(blades.len() as u32)),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let id_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass texture ids"),
            contents: bytemuck::cast_slice(&ids),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let blade_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass blades"),
            contents: bytemuck::cast_slice(blades),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let matrix_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grass matrices"),
            contents: bytemuck::bytes_of(matrices),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grass sky slots"),
            entries: &grass_sky_entries(),
        });
        let sky_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass sky slots"),
            layout: &sky_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: GRASS_SLOT_FRAME_STATE,
                    resource: frame_state_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: GRASS_SLOT_TEXTURE_IDS,
                    resource: id_buffer.as_entire_binding(),
                },
            ],
        });

        let blades_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grass blade slots"),
            entries: &grass_blade_entries(),
        });
        let blades_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass blade slots"),
            layout: &blades_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: GRASS_SLOT_FRAME_STATE,
                    resource: frame_state_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: GRASS_SLOT_TEXTURE_IDS,
                    resource: id_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: GRASS_SLOT_BLADES,
                    resource: blade_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: GRASS_SLOT_MATRICES,
                    resource: matrix_buffer.as_entire_binding(),
                },
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grass sky layers"),
            entries: &texture_pair_entries(textures.len() as u32),
        });
        let mut texture_entries = Vec::with_capacity(textures.len() * 2);
        for (pair, entry) in textures.textures.iter().enumerate() {
            texture_entries.push(wgpu::BindGroupEntry {
                binding: pair as u32 * 2,
                resource: wgpu::BindingResource::TextureView(&entry.view),
            });
            texture_entries.push(wgpu::BindGroupEntry {
                binding: pair as u32 * 2 + 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }
        let texture_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass sky layers"),
            layout: &texture_layout,
            entries: &texture_entries,
        });

        Self {
            sky_layout,
            sky_group,
            blades_layout,
            blades_group,
            texture_layout,
            texture_group,
            matrix_buffer,
            _frame_state_buffer: frame_state_buffer,
            _id_buffer: id_buffer,
            _blade_buffer: blade_buffer,
        }
    }
}
