use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::{
    event::*,
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};
use zodiac_core::{frame_dt_sec, FrameInput, RevealConfig, RevealController};
use zodiac_render::{GpuContext, Renderer};

// Pixels scrolled per wheel line, roughly what browsers use
const LINE_SCROLL_PX: f32 = 40.0;

#[derive(Default)]
struct PointerState {
    px: Option<Vec2>,
    scroll_px: f32,
    moved: bool,
}

impl PointerState {
    fn ndc(&self, width: u32, height: u32) -> Vec2 {
        match self.px {
            Some(p) => Vec2::new(
                (2.0 * p.x / width.max(1) as f32 - 1.0).clamp(-1.0, 1.0),
                (1.0 - 2.0 * p.y / height.max(1) as f32).clamp(-1.0, 1.0),
            ),
            None => Vec2::ZERO,
        }
    }
}

struct Preview {
    window: Arc<Window>,
    renderer: Renderer,
    controller: RevealController,
    pointer: PointerState,
    started: Instant,
    last_ms: f64,
}

impl Preview {
    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns false once the reveal has finished.
    fn frame(&mut self) -> Result<bool, wgpu::SurfaceError> {
        let now = self.now_ms();
        let dt_sec = frame_dt_sec(now - self.last_ms);
        self.last_ms = now;
        let size = self.window.inner_size();

        if std::mem::take(&mut self.pointer.moved) {
            if let Some(p) = self.pointer.px {
                let (ro, rd) = self.renderer.camera().screen_ray(
                    p.x,
                    p.y,
                    size.width as f32,
                    size.height as f32,
                );
                if let Some((ci, vi)) = self.controller.hover(ro, rd, now) {
                    log::debug!("[constellation] pulse {}:{}", ci, vi);
                }
            }
        }

        let out = self.controller.tick(
            now,
            FrameInput {
                dt_sec,
                pointer_ndc: self.pointer.ndc(size.width, size.height),
                scroll_px: self.pointer.scroll_px,
            },
        );
        if let Some(i) = out.phase_changed {
            if let Some(phase) = self.controller.phases().get(i) {
                self.window
                    .set_title(&format!("Zodiac preview: {} ({:.0}%)", phase.label, out.progress));
            }
        }
        self.renderer.render(&out, &self.controller, now, dt_sec)?;
        Ok(out.running)
    }
}

fn load_config() -> anyhow::Result<RevealConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            log::info!("[loader] config from {}", path);
            Ok(RevealConfig::from_json(&json)?)
        }
        None => Ok(RevealConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = load_config()?;
    let loaded = Rc::new(Cell::new(false));
    let loaded_flag = loaded.clone();
    let on_loaded: Box<dyn FnOnce()> = Box::new(move || {
        log::info!("[loader] loaded");
        loaded_flag.set(true);
    });
    let mut controller = RevealController::new(config, Some(on_loaded))?;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Zodiac preview")
            .build(&event_loop)?,
    );
    let size = window.inner_size();
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(Arc::clone(&window))?;
    let gpu = pollster::block_on(GpuContext::request(&instance, surface, size.width, size.height))?;
    let renderer = Renderer::new(gpu, &controller);

    controller.start(0.0);
    let mut preview = Preview {
        window,
        renderer,
        controller,
        pointer: PointerState::default(),
        started: Instant::now(),
        last_ms: 0.0,
    };

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => preview.renderer.resize_if_needed(size.width, size.height),
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => {
            preview.pointer.px = Some(Vec2::new(position.x as f32, position.y as f32));
            preview.pointer.moved = true;
        }
        Event::WindowEvent {
            event: WindowEvent::CursorLeft { .. },
            ..
        } => preview.pointer.px = None,
        Event::WindowEvent {
            event: WindowEvent::MouseWheel { delta, .. },
            ..
        } => {
            let dy = match delta {
                MouseScrollDelta::LineDelta(_, y) => y * LINE_SCROLL_PX,
                MouseScrollDelta::PixelDelta(p) => p.y as f32,
            };
            preview.pointer.scroll_px = (preview.pointer.scroll_px - dy).max(0.0);
        }
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => {
            preview.controller.unmount();
            elwt.exit();
        }
        Event::AboutToWait => match preview.frame() {
            Ok(true) => preview.window.request_redraw(),
            Ok(false) => {
                if loaded.get() {
                    log::info!("[loader] reveal finished, closing preview");
                }
                elwt.exit();
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                preview.renderer.reconfigure()
            }
            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
            Err(e) => log::error!("[gpu] render error: {:?}", e),
        },
        _ => {}
    })?;
    Ok(())
}
