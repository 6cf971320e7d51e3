//! Render pipelines and the fixed state behind them.
//!
//! Each draw stage owns an immutable depth/blend tuple (its "store") that is
//! decided here once at setup and never mutated per frame. The pack only
//! supplies the kernel modules; everything else about a stage is fixed.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context as AnyhowContext, Result};

use crate::gpu::context::DEPTH_FORMAT;

/// Entry points every kernel module must export.
pub(crate) const VERTEX_ENTRY: &str = "vs_main";
pub(crate) const FRAGMENT_ENTRY: &str = "fs_main";

const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Immutable depth/blend tuple for one draw stage.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StageStore {
    pub label: &'static str,
    pub depth_compare: Option<wgpu::CompareFunction>,
    pub depth_write: bool,
    pub blend: Option<wgpu::BlendState>,
}

/// Film background: depth tested and written, opaque.
pub(crate) fn film_background_store() -> StageStore {
    StageStore {
        label: "film background",
        depth_compare: Some(wgpu::CompareFunction::Less),
        depth_write: true,
        blend: None,
    }
}

/// Film cells: drawn only where the background wrote matching depth,
/// accumulated additively, never touching depth themselves.
pub(crate) fn film_cells_store() -> StageStore {
    StageStore {
        label: "film cells",
        depth_compare: Some(wgpu::CompareFunction::Equal),
        depth_write: false,
        blend: Some(ADDITIVE_BLEND),
    }
}

/// Grass stages: no depth attachment at all, classic alpha blending.
pub(crate) fn grass_store(label: &'static str) -> StageStore {
    StageStore {
        label,
        depth_compare: None,
        depth_write: false,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
    }
}

/// Strip sampler: trilinear, clamping U so the strip's side edges pin,
/// repeating V so the column of cells wraps as the strip scrolls.
pub(crate) fn film_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("film sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Sky and blade sampler: bilinear, clamped on both axes, single mip.
pub(crate) fn grass_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("grass sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Reads one WGSL kernel module from the pack directory.
pub(crate) fn load_kernel(device: &wgpu::Device, path: &Path) -> Result<wgpu::ShaderModule> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read kernel {}", path.display()))?;
    let label = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("kernel");
    tracing::debug!(kernel = %path.display(), bytes = source.len(), "loaded kernel module");
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
    }))
}

/// Vertex attributes for the strip mesh: position, then cell-local UV.
pub(crate) const STRIP_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

pub(crate) fn strip_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<scenestate::StripVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &STRIP_VERTEX_ATTRIBUTES,
    }
}

pub(crate) struct PipelineSpec<'a> {
    pub label: &'a str,
    pub module: &'a wgpu::ShaderModule,
    pub layouts: &'a [&'a wgpu::BindGroupLayout],
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub store: StageStore,
    pub format: wgpu::TextureFormat,
}

/// Builds one render pipeline from a kernel module and its stage store.
/// Culling stays off: the strip shows its back face while it curls, and
/// blades are flat cards.
pub(crate) fn build_pipeline(
    device: &wgpu::Device,
    spec: &PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(spec.label),
        bind_group_layouts: spec.layouts,
        push_constant_ranges: &[],
    });

    let depth_stencil = spec
        .store
        .depth_compare
        .map(|compare| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.store.depth_write,
            depth_compare: compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: spec.module,
            entry_point: Some(VERTEX_ENTRY),
            buffers: spec.vertex_buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: spec.module,
            entry_point: Some(FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format: spec.format,
                blend: spec.store.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_store_writes_depth_without_blending() {
        let store = film_background_store();
        assert_eq!(store.depth_compare, Some(wgpu::CompareFunction::Less));
        assert!(store.depth_write);
        assert!(store.blend.is_none());
    }

    #[test]
    fn cells_store_tests_equal_and_accumulates() {
        let store = film_cells_store();
        assert_eq!(store.depth_compare, Some(wgpu::CompareFunction::Equal));
        assert!(!store.depth_write);
        let blend = store.blend.unwrap();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
    }

    #[test]
    fn grass_store_skips_depth_and_alpha_blends() {
        let store = grass_store("grass sky");
        assert!(store.depth_compare.is_none());
        assert_eq!(store.blend, Some(wgpu::BlendState::ALPHA_BLENDING));
    }

    #[test]
    fn strip_vertices_are_packed_position_then_uv() {
        let layout = strip_vertex_layout();
        assert_eq!(layout.array_stride, 20);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].shader_location, 1);
    }
}
