//! Scene assembly and per-frame encoding.
//!
//! `SceneRenderer` runs the whole setup sequence once, in order: texture
//! set, host-side state, slot bindings, kernel pipelines. After that a
//! frame is a fixed choreography of two draw stages; nothing is rebuilt
//! per frame and the only buffer the host ever rewrites is the film pose
//! (every frame the pointer moves) and the matrix block (on resize).

use anyhow::Result;
use chrono::Timelike;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use scenestate::{blade_rng, generate_blades, FilmPose, MatrixBlock, StripGeometry};

use crate::gpu::bindings::{FilmBindings, GrassBindings};
use crate::gpu::context::{DepthTarget, GpuContext};
use crate::gpu::programs::{self, PipelineSpec};
use crate::gpu::textures::{self, TextureSet};
use crate::types::{SceneKind, SceneSpec};

/// Vertices the blade kernel expands per instance: eight segment quads.
const BLADE_VERTICES: u32 = 48;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

struct FilmScene {
    background: wgpu::RenderPipeline,
    cells: wgpu::RenderPipeline,
    bindings: FilmBindings,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    geometry: StripGeometry,
    depth: DepthTarget,
    _textures: TextureSet,
}

struct GrassScene {
    sky: wgpu::RenderPipeline,
    blades: wgpu::RenderPipeline,
    bindings: GrassBindings,
    blade_count: u32,
    _textures: TextureSet,
}

enum SceneGraph {
    Film(FilmScene),
    Grass(GrassScene),
}

pub(crate) struct SceneRenderer {
    context: GpuContext,
    scene: SceneGraph,
}

impl SceneRenderer {
    pub(crate) fn new<T>(
        target: &T,
        size: PhysicalSize<u32>,
        spec: &SceneSpec,
        seed: Option<u64>,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size)?;
        let textures = textures::load_texture_set(
            &context.device,
            &context.queue,
            spec.kind,
            &spec.textures,
        )?;
        match spec.kind {
            SceneKind::Film => Self::setup_film(context, spec, textures),
            SceneKind::Grass => Self::setup_grass(context, spec, textures, seed),
        }
    }

    fn setup_film(context: GpuContext, spec: &SceneSpec, textures: TextureSet) -> Result<Self> {
        let device = &context.device;
        let geometry = StripGeometry::generate(textures.len() as u32);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("strip vertices"),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("strip indices"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let matrices = MatrixBlock::projection_normalized(
            context.size.width as f32,
            context.size.height as f32,
        );
        let sampler = programs::film_sampler(device);
        let bindings = FilmBindings::new(device, &geometry, &textures, &matrices, &sampler);

        let background_module = programs::load_kernel(device, &spec.background_kernel)?;
        let cells_module = programs::load_kernel(device, &spec.foreground_kernel)?;
        let vertex_buffers = [programs::strip_vertex_layout()];
        // The background stage sees only the slot group; cell textures are
        // a second group the cells stage rebinds per draw.
        let background = programs::build_pipeline(
            device,
            &PipelineSpec {
                label: "film background",
                module: &background_module,
                layouts: &[&bindings.slot_layout],
                vertex_buffers: &vertex_buffers,
                store: programs::film_background_store(),
                format: context.surface_format,
            },
        );
        let cells = programs::build_pipeline(
            device,
            &PipelineSpec {
                label: "film cells",
                module: &cells_module,
                layouts: &[&bindings.slot_layout, &bindings.texture_layout],
                vertex_buffers: &vertex_buffers,
                store: programs::film_cells_store(),
                format: context.surface_format,
            },
        );
        let depth = DepthTarget::new(device, context.size);
        tracing::info!(cells = geometry.cells(), "film scene ready");

        let renderer = Self {
            context,
            scene: SceneGraph::Film(FilmScene {
                background,
                cells,
                bindings,
                vertex_buffer,
                index_buffer,
                geometry,
                depth,
                _textures: textures,
            }),
        };
        // Setup ends exactly like a pointer release at the origin.
        renderer.set_film_strip_position(0.0, 0.0);
        Ok(renderer)
    }

    fn setup_grass(
        context: GpuContext,
        spec: &SceneSpec,
        textures: TextureSet,
        seed: Option<u64>,
    ) -> Result<Self> {
        let device = &context.device;
        let mut rng = blade_rng(seed);
        let blades = generate_blades(
            context.size.width as f32,
            context.size.height as f32,
            spec.blade_count,
            &mut rng,
        );
        let matrices =
            MatrixBlock::ortho_window(context.size.width as f32, context.size.height as f32);
        let sampler = programs::grass_sampler(device);
        let bindings = GrassBindings::new(device, &blades, &textures, &matrices, &sampler);

        let sky_module = programs::load_kernel(device, &spec.background_kernel)?;
        let blades_module = programs::load_kernel(device, &spec.foreground_kernel)?;
        let sky = programs::build_pipeline(
            device,
            &PipelineSpec {
                label: "grass sky",
                module: &sky_module,
                layouts: &[&bindings.sky_layout, &bindings.texture_layout],
                vertex_buffers: &[],
                store: programs::grass_store("grass sky"),
                format: context.surface_format,
            },
        );
        let blades_pipeline = programs::build_pipeline(
            device,
            &PipelineSpec {
                label: "grass blades",
                module: &blades_module,
                layouts: &[&bindings.blades_layout],
                vertex_buffers: &[],
                store: programs::grass_store("grass blades"),
                format: context.surface_format,
            },
        );

        tracing::info!(
            blades = blades.len(),
            local_hour = chrono::Local::now().hour(),
            "grass scene ready"
        );

        Ok(Self {
            context,
            scene: SceneGraph::Grass(GrassScene {
                sky,
                blades: blades_pipeline,
                bindings,
                blade_count: blades.len() as u32,
                _textures: textures,
            }),
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Live pointer update. Takes `&self`: the write lands on the queue and
    /// competes with no host-side state, so callers never need the renderer
    /// mutably just to steer the strip. Grass scenes have no strip and
    /// ignore it.
    pub(crate) fn set_film_strip_position(&self, x: f32, y: f32) {
        if let SceneGraph::Film(film) = &self.scene {
            let pose = FilmPose::from_pointer(x, y);
            tracing::trace!(
                x,
                y,
                translate = pose.translate,
                rotate = pose.rotate,
                focus = pose.focus,
                "strip position update"
            );
            self.context
                .queue
                .write_buffer(&film.bindings.pose_buffer, 0, bytemuck::bytes_of(&pose));
        }
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        let width = new_size.width as f32;
        let height = new_size.height as f32;
        match &mut self.scene {
            SceneGraph::Film(film) => {
                film.depth = DepthTarget::new(&self.context.device, new_size);
                let matrices = MatrixBlock::projection_normalized(width, height);
                self.context.queue.write_buffer(
                    &film.bindings.matrix_buffer,
                    0,
                    bytemuck::bytes_of(&matrices),
                );
            }
            SceneGraph::Grass(grass) => {
                // The blade field is never regenerated; only the projection
                // tracks the surface.
                let matrices = MatrixBlock::ortho_window(width, height);
                self.context.queue.write_buffer(
                    &grass.bindings.matrix_buffer,
                    0,
                    bytemuck::bytes_of(&matrices),
                );
            }
        }
    }

    pub(crate) fn render_frame(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("scene frame"),
                });

        match &self.scene {
            SceneGraph::Film(film) => encode_film(&mut encoder, &view, film),
            SceneGraph::Grass(grass) => encode_grass(&mut encoder, &view, grass),
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn encode_film(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, film: &FilmScene) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("film pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &film.depth.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    });

    pass.set_vertex_buffer(0, film.vertex_buffer.slice(..));
    pass.set_index_buffer(film.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    pass.set_bind_group(0, &film.bindings.slot_group, &[]);

    // Whole strip first: the background writes the depth the cells then
    // test for equality, so cells light up only on their own quads.
    pass.set_pipeline(&film.background);
    pass.draw_indexed(0..film.geometry.indices.len() as u32, 0, 0..1);

    pass.set_pipeline(&film.cells);
    for cell in 0..film.geometry.cells() {
        pass.set_bind_group(1, &film.bindings.texture_groups[cell as usize], &[]);
        pass.draw_indexed(film.geometry.cell_index_range(cell), 0, cell..cell + 1);
    }
}

fn encode_grass(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, grass: &GrassScene) {
    // The sky stage advances the frame counter, so the blades run in a
    // second pass where the same buffer can bind read-only.
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("grass sky pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&grass.sky);
        pass.set_bind_group(0, &grass.bindings.sky_group, &[]);
        pass.set_bind_group(1, &grass.bindings.texture_group, &[]);
        pass.draw(0..3, 0..1);
    }
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("grass blade pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&grass.blades);
        pass.set_bind_group(0, &grass.bindings.blades_group, &[]);
        pass.draw(0..BLADE_VERTICES, 0..grass.blade_count);
    }
}
