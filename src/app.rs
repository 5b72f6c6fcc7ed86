//! Window host: owns the session and drives one tick per display refresh.

use std::sync::Arc;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::audio::AudioBackend;
use crate::motion::CanvasDimensions;
use crate::params::{RenderConfig, SessionConfig, VisualizerConfig};
use crate::rendering::{RenderSystem, Viewport};
use crate::session::{Session, SessionState, TickOutcome};
use crate::visualizer::Visualizer;

const TITLE: &str = "Voice Canvas";

/// Window title for a session state
pub fn window_title(state: &SessionState) -> String {
    match state {
        SessionState::Idle => format!("{TITLE} - press Space to draw"),
        SessionState::Active => format!("{TITLE} - recording"),
        SessionState::Error(message) => format!("{TITLE} - {message}"),
    }
}

/// Device-pixel rectangle of the bar chart, anchored bottom-left
pub fn overlay_viewport(config: &VisualizerConfig, surface_height: u32, scale_factor: f64) -> Viewport {
    let scale = scale_factor as f32;
    Viewport {
        x: config.margin * scale,
        y: surface_height as f32 - (config.margin + config.height) * scale,
        width: config.width * scale,
        height: config.height * scale,
    }
}

/// Main application state
pub struct App<B: AudioBackend> {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Drawing
    session: Session<B>,
    visualizer: Option<Visualizer>,

    // Configuration
    render_config: RenderConfig,
}

impl<B: AudioBackend> App<B> {
    pub fn new(backend: B, config: SessionConfig, render_config: RenderConfig) -> Self {
        let visualizer = render_config.show_visualizer.then(|| {
            Visualizer::new(
                VisualizerConfig::default(),
                config.analyzer.clone(),
                config.stroke.pixel_density,
            )
        });
        let dimensions = CanvasDimensions::new(
            render_config.window_width as f32,
            render_config.window_height as f32,
        );

        Self {
            window: None,
            render_system: None,
            session: Session::new(backend, config, dimensions),
            visualizer,
            render_config,
        }
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    fn toggle_recording(&mut self) {
        if self.session.is_recording() {
            self.session.stop();
        } else if let Err(err) = self.session.start() {
            error!("{}", err);
        }
        self.refresh();
    }

    /// Sync the title with the session and schedule a redraw
    fn refresh(&self) {
        if let Some(window) = &self.window {
            window.set_title(&window_title(self.session.state()));
            window.request_redraw();
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(window) = &self.window else {
            return;
        };
        // Minimized; keep the strokes for when the window comes back
        if size.width == 0 || size.height == 0 {
            return;
        }
        let logical = size.to_logical::<f32>(window.scale_factor());
        self.session.resize(logical.width, logical.height);
        if let Some(render_system) = self.render_system.as_mut() {
            render_system.resize(size.width, size.height);
        }
        window.request_redraw();
    }

    /// Tick the session and present a frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        if let TickOutcome::Faulted(err) = self.session.tick() {
            error!("Recording stopped: {}", err);
            self.refresh();
        }

        let Some(window) = &self.window else {
            return;
        };
        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        if self.session.surface().is_dirty() {
            match self.session.surface().pixmap() {
                Some(pixmap) => render_system.upload_canvas(pixmap),
                None => render_system.clear_canvas(),
            }
            self.session.surface_mut().mark_clean();
        }

        // Chart shows only while recording, from the snapshot this tick pulled
        let mut overlay = None;
        if self.session.is_recording() {
            if let (Some(visualizer), Some(snapshot)) =
                (self.visualizer.as_mut(), self.session.latest_snapshot())
            {
                visualizer.paint(snapshot);
                if let Some(pixmap) = visualizer.pixmap() {
                    render_system.upload_overlay(pixmap);
                    let (_, height) = render_system.size();
                    overlay = Some(overlay_viewport(
                        visualizer.config(),
                        height,
                        window.scale_factor(),
                    ));
                }
            }
        }

        match render_system.render(overlay) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_system.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {:?}", e),
        }
    }
}

impl<B: AudioBackend> ApplicationHandler for App<B> {
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        if self.session.is_recording() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        // Create window
        let window_attributes = Window::default_attributes()
            .with_title(window_title(self.session.state()))
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Could not create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        // Initialize rendering system
        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            self.render_config.background_rgb,
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                error!("Could not initialize rendering: {}", e);
                event_loop.exit();
                return;
            }
        };

        info!("Press Space or R to start/stop, C to clear, Esc to quit");

        self.session
            .surface_mut()
            .set_max_dimension(render_system.max_texture_dimension());

        let size = window.inner_size();
        self.window = Some(window);
        self.render_system = Some(render_system);
        self.resize(size);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.session.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => {
                    self.session.stop();
                    event_loop.exit();
                }
                KeyCode::Space | KeyCode::KeyR => self.toggle_recording(),
                KeyCode::KeyC => {
                    self.session.clear();
                    self.refresh();
                }
                _ => {}
            },
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_title_mirrors_state() {
        assert!(window_title(&SessionState::Active).ends_with("recording"));
        assert!(window_title(&SessionState::Idle).contains("Space"));
        assert_eq!(
            window_title(&SessionState::Error("no mic".into())),
            "Voice Canvas - no mic"
        );
    }

    #[test]
    fn test_overlay_viewport_bottom_left() {
        let config = VisualizerConfig::default();

        let vp = overlay_viewport(&config, 720, 1.0);
        assert_eq!(vp, Viewport { x: 16.0, y: 604.0, width: 300.0, height: 100.0 });

        let vp = overlay_viewport(&config, 1440, 2.0);
        assert_eq!(vp, Viewport { x: 32.0, y: 1208.0, width: 600.0, height: 200.0 });
    }
}
