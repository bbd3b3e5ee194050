//! Desktop harness: a winit window whose title reports pointer state.
//!
//! Nothing is drawn; the window exists to receive mouse input.

use crate::config::AppConfig;
use crate::demo::DemoScene;
use anyhow::Result;
use raypoint_camera::Camera;
use raypoint_input::InputState;
use raypoint_pointer::{DeviceCaps, Frame, Pointer};
use std::time::Instant;
use tracing::{info, warn};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

/// What the event loop should do next.
pub enum WindowAction {
    Continue,
    Quit,
}

pub struct DemoWindow {
    window: Window,
    demo: DemoScene,
    camera: Camera,
    input: InputState,
    pointer: Pointer,
    started: Instant,
    title: String,
}

impl DemoWindow {
    /// Create the window and start a pointer session.
    pub fn new(event_loop: &EventLoopWindowTarget<()>, config: &AppConfig) -> Result<Self> {
        let window = winit::window::WindowBuilder::new()
            .with_title("raypoint")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                config.window_width,
                config.window_height,
            ))
            .build(event_loop)?;

        let size = window.inner_size();
        let demo = DemoScene::build(config);
        let mut camera = DemoScene::camera(config);
        camera.set_aspect(size.width, size.height);
        let input = InputState::with_viewport(size.width, size.height);
        let pointer = Pointer::new(DemoScene::pointer_config(config), DeviceCaps::default())?;
        demo.attach(&pointer);

        Ok(Self {
            window,
            demo,
            camera,
            input,
            pointer,
            started: Instant::now(),
            title: String::new(),
        })
    }

    /// Handle an event
    pub fn handle_event(
        &mut self,
        event: &Event<()>,
        _elwt: &EventLoopWindowTarget<()>,
    ) -> WindowAction {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.window.id() => {
                self.input.handle_event(event);
                match event {
                    WindowEvent::CloseRequested => return WindowAction::Quit,
                    WindowEvent::KeyboardInput { event, .. } => {
                        if let PhysicalKey::Code(KeyCode::Escape) = event.physical_key {
                            if event.state.is_pressed() {
                                return WindowAction::Quit;
                            }
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        self.camera.set_aspect(new_size.width, new_size.height);
                    }
                    WindowEvent::RedrawRequested => self.update(),
                    _ => {}
                }
            }
            Event::DeviceEvent { event, .. } => self.input.handle_device_event(event),
            Event::AboutToWait => self.window.request_redraw(),
            Event::LoopExiting => {
                self.pointer.end_session();
            }
            _ => {}
        }
        WindowAction::Continue
    }

    fn update(&mut self) {
        let time_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let report = self.pointer.tick(
            time_ms,
            &self.demo.scene,
            Frame {
                camera: &mut self.camera,
                input: &self.input,
                controller: None,
            },
        );
        for failure in &report.failures {
            warn!(listener = ?failure.listener, error = %failure.error, "Handler failed");
        }
        self.input.begin_frame();
        self.demo.animate();

        let hovered = self
            .pointer
            .hovered()
            .map(|id| self.demo.name_of(id).to_string())
            .unwrap_or_else(|| "nothing".to_string());
        let title = format!(
            "raypoint - hovering {hovered} - cube {} - {} clicks",
            self.demo.cube_colour().as_str(),
            self.pointer.click_count()
        );
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut window = DemoWindow::new(&event_loop, &config)?;
    info!(mode = window.pointer.mode().as_str(), "Window open");

    event_loop.run(move |event, elwt| match window.handle_event(&event, elwt) {
        WindowAction::Continue => {}
        WindowAction::Quit => {
            info!("Quitting");
            elwt.exit();
        }
    })?;
    Ok(())
}
