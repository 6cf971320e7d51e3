use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::gpu::SceneRenderer;
use crate::types::RendererConfig;

/// Aggregates the window, the scene, and pointer tracking for the preview.
struct WindowState {
    window: Arc<Window>,
    scene: SceneRenderer,
    pointer: PointerState,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let scene = SceneRenderer::new(window.as_ref(), size, &config.scene, config.seed)?;
        Ok(Self {
            window,
            scene,
            pointer: PointerState::default(),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }
}

/// Runs the interactive preview until the window closes.
pub(crate) fn run_preview(config: &RendererConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(format!("wallscene - {}", config.scene.name))
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window.clone(), config)?;
    let mut pacer = FramePacer::new(config.target_fps);
    let still = config.still;

    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| {
            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            elwt.exit();
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            if let Some(position) = state.pointer.handle_cursor_moved(position) {
                                state
                                    .scene
                                    .set_film_strip_position(position.x as f32, position.y as f32);
                            }
                        }
                        WindowEvent::MouseInput {
                            state: button_state,
                            button: MouseButton::Left,
                            ..
                        } => {
                            if let Some(position) = state.pointer.handle_button(button_state) {
                                state
                                    .scene
                                    .set_film_strip_position(position.x as f32, position.y as f32);
                            }
                        }
                        WindowEvent::Resized(new_size) => {
                            state.scene.resize(new_size);
                        }
                        WindowEvent::ScaleFactorChanged {
                            mut inner_size_writer,
                            ..
                        } => {
                            let _ = inner_size_writer.request_inner_size(state.scene.size());
                        }
                        WindowEvent::RedrawRequested => match state.scene.render_frame() {
                            Ok(()) => {
                                pacer.mark_rendered(Instant::now());
                                if still {
                                    elwt.exit();
                                }
                            }
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                let size = state.scene.size();
                                state.scene.resize(size);
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                tracing::error!("surface out of memory; exiting preview");
                                elwt.exit();
                            }
                            Err(err) => {
                                tracing::warn!(error = ?err, "surface error; retrying next frame");
                            }
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    let now = Instant::now();
                    if pacer.ready(now) {
                        state.window().request_redraw();
                        elwt.set_control_flow(ControlFlow::Wait);
                    } else if let Some(deadline) = pacer.next_deadline() {
                        elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                    } else {
                        elwt.set_control_flow(ControlFlow::Wait);
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

/// Pointer tracking for the strip. The strip only follows an active drag,
/// so moves while released update the cached position and nothing else.
#[derive(Default)]
struct PointerState {
    position: Option<PhysicalPosition<f64>>,
    is_pressed: bool,
}

impl PointerState {
    /// Returns the position to forward while a drag is active.
    fn handle_cursor_moved(
        &mut self,
        position: PhysicalPosition<f64>,
    ) -> Option<PhysicalPosition<f64>> {
        self.position = Some(position);
        self.is_pressed.then_some(position)
    }

    /// Returns the position to forward when a drag starts.
    fn handle_button(&mut self, state: ElementState) -> Option<PhysicalPosition<f64>> {
        match state {
            ElementState::Pressed => {
                self.is_pressed = true;
                self.position
            }
            ElementState::Released => {
                self.is_pressed = false;
                None
            }
        }
    }
}

/// Caps redraws at the configured rate; uncapped loops redraw on every
/// callback and let the present mode pace them.
struct FramePacer {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FramePacer {
    fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            last_frame: None,
        }
    }

    fn ready(&self, now: Instant) -> bool {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => now.duration_since(last) >= interval,
            _ => true,
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }

    fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_pacer_is_always_ready() {
        let mut pacer = FramePacer::new(None);
        let now = Instant::now();
        assert!(pacer.ready(now));
        pacer.mark_rendered(now);
        assert!(pacer.ready(now));
        assert!(pacer.next_deadline().is_none());
    }

    #[test]
    fn capped_pacer_waits_out_the_interval() {
        let mut pacer = FramePacer::new(Some(50.0));
        let start = Instant::now();
        assert!(pacer.ready(start));
        pacer.mark_rendered(start);
        assert!(!pacer.ready(start));
        assert_eq!(pacer.next_deadline(), Some(start + Duration::from_millis(20)));
        assert!(pacer.ready(start + Duration::from_millis(25)));
    }

    #[test]
    fn zero_fps_cap_is_treated_as_uncapped() {
        let pacer = FramePacer::new(Some(0.0));
        assert!(pacer.interval.is_none());
    }

    #[test]
    fn pointer_forwards_only_while_dragging() {
        let mut pointer = PointerState::default();
        let position = PhysicalPosition::new(120.0, 80.0);

        assert!(pointer.handle_cursor_moved(position).is_none());
        assert_eq!(pointer.handle_button(ElementState::Pressed), Some(position));
        assert_eq!(pointer.handle_cursor_moved(position), Some(position));
        assert!(pointer.handle_button(ElementState::Released).is_none());
        assert!(pointer.handle_cursor_moved(position).is_none());
    }

    #[test]
    fn press_before_any_motion_forwards_nothing() {
        let mut pointer = PointerState::default();
        assert!(pointer.handle_button(ElementState::Pressed).is_none());
    }
}
