//! Application controller: window, permission flow, device menu and the
//! capture-to-render handoff.

use std::sync::{Arc, Mutex};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::ModifiersState;
use winit::window::{Window, WindowId};

use crate::camera::{CameraError, CaptureBackend, Frame, FrameObserver};
use crate::config::ConfigError;
use crate::input::{handle_key, KeyAction};
use crate::mailbox::LatestValue;
use crate::permissions::PermissionProvider;
use crate::render::{FrameRenderer, RenderError, RenderOutcome};
use crate::viewer::{Viewer, ViewerOptions};

/// Events sent to the UI thread from other threads.
#[derive(Debug)]
pub enum UserEvent {
    /// A frame was posted into an empty mailbox
    FrameReady,
    /// The access request finished
    PermissionResolved(bool),
    /// Ctrl+C was received
    Shutdown,
}

/// Top-level error for the viewer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Window and startup settings.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Menu index to start on
    pub device: Option<usize>,
    pub open_settings_on_denial: bool,
}

/// Capture-thread side of the handoff: posts frames and wakes the UI thread.
pub struct FrameForwarder {
    mailbox: Arc<LatestValue<Frame>>,
    proxy: Mutex<EventLoopProxy<UserEvent>>,
}

impl FrameForwarder {
    pub fn new(mailbox: Arc<LatestValue<Frame>>, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            mailbox,
            proxy: Mutex::new(proxy),
        }
    }
}

impl FrameObserver for FrameForwarder {
    fn did_capture_frame(&self, frame: Frame) {
        if !self.mailbox.post(frame) {
            return;
        }
        if let Ok(proxy) = self.proxy.lock() {
            // Fails only once the event loop is gone
            let _ = proxy.send_event(UserEvent::FrameReady);
        }
    }
}

/// Drives the viewer on the UI thread.
pub struct App<B: CaptureBackend, P: PermissionProvider> {
    options: AppOptions,
    viewer: Viewer<B, P>,
    mailbox: Arc<LatestValue<Frame>>,
    // The controller only holds a weak reference
    _observer: Arc<FrameForwarder>,
    proxy: EventLoopProxy<UserEvent>,
    renderer: Option<FrameRenderer>,
    last_frame: Option<Frame>,
    modifiers: ModifiersState,
    error: Option<AppError>,
}

impl<B: CaptureBackend, P: PermissionProvider> App<B, P> {
    pub fn new(
        backend: B,
        permissions: P,
        options: AppOptions,
        proxy: EventLoopProxy<UserEvent>,
    ) -> Self {
        let mut viewer = Viewer::new(
            backend,
            permissions,
            ViewerOptions {
                device: options.device,
                open_settings_on_denial: options.open_settings_on_denial,
            },
        );

        let mailbox = Arc::new(LatestValue::new());
        let forwarder = Arc::new(FrameForwarder::new(Arc::clone(&mailbox), proxy.clone()));
        viewer.set_observer(&forwarder);

        Self {
            options,
            viewer,
            mailbox,
            _observer: forwarder,
            proxy,
            renderer: None,
            last_frame: None,
            modifiers: ModifiersState::empty(),
            error: None,
        }
    }

    /// The error that ended the event loop, if any.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    /// Apply the result of a viewer step to the window.
    fn after_step(&mut self, event_loop: &ActiveEventLoop, result: Result<(), AppError>) {
        match result {
            Ok(()) => self.update_title(),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attributes = Window::default_attributes()
            .with_title(self.window_title())
            .with_inner_size(LogicalSize::new(self.options.width, self.options.height));
        let window = Arc::new(event_loop.create_window(attributes)?);
        self.renderer = Some(FrameRenderer::new(window)?);
        Ok(())
    }

    fn window_title(&self) -> String {
        match self.viewer.menu().selected_title() {
            Some(device) => format!("{} - {}", self.options.title, device),
            None => self.options.title.clone(),
        }
    }

    fn update_title(&self) {
        if let Some(renderer) = &self.renderer {
            renderer.window().set_title(&self.window_title());
        }
    }

    fn handle_key_action(&mut self, event_loop: &ActiveEventLoop, action: KeyAction) {
        if action == KeyAction::Quit {
            event_loop.exit();
            return;
        }
        let result = self.viewer.select(action).map(|_| ());
        self.after_step(event_loop, result);
    }

    fn redraw(&mut self) {
        if let Some(frame) = self.mailbox.take() {
            self.last_frame = Some(frame);
        }
        let (Some(renderer), Some(frame)) = (self.renderer.as_mut(), self.last_frame.as_ref())
        else {
            return;
        };

        let view = renderer.view_bounds();
        match renderer.render_frame(frame, view) {
            Ok(RenderOutcome::Presented(layout)) => {
                log::trace!("Presented frame {} into {:?}", frame.sequence, layout.target);
            }
            Ok(RenderOutcome::Skipped) => {
                log::trace!("Skipped frame {}", frame.sequence);
            }
            Err(e) => log::error!("{}", e),
        }
    }
}

impl<B: CaptureBackend, P: PermissionProvider> ApplicationHandler<UserEvent> for App<B, P> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(e) = self.create_renderer(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        let proxy = self.proxy.clone();
        let result = self.viewer.begin(Box::new(move |granted| {
            let _ = proxy.send_event(UserEvent::PermissionResolved(granted));
        }));
        self.after_step(event_loop, result);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::FrameReady => {
                if let Some(renderer) = &self.renderer {
                    renderer.window().request_redraw();
                }
            }
            UserEvent::PermissionResolved(granted) => {
                let result = self.viewer.resolve_access(granted);
                self.after_step(event_loop, result);
            }
            UserEvent::Shutdown => {
                log::info!("Received Ctrl+C, shutting down");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                    renderer.window().request_redraw();
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    let action = handle_key(&event.logical_key, self.modifiers.shift_key());
                    self.handle_key_action(event_loop, action);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.viewer.stop();
    }
}

/// Open the viewer window and run until it is closed.
///
/// Devices are enumerated once camera access is granted.
///
/// # Errors
/// * `AppError::Camera` - no devices, or `--device` out of range
/// * `AppError::Render` - no GPU adapter
/// * `AppError::EventLoop` / `AppError::Window` - windowing failures
pub fn run<B: CaptureBackend, P: PermissionProvider>(
    backend: B,
    permissions: P,
    options: AppOptions,
) -> Result<(), AppError> {
    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let shutdown = event_loop.create_proxy();
    ctrlc::set_handler(move || {
        let _ = shutdown.send_event(UserEvent::Shutdown);
    })?;

    let mut app = App::new(backend, permissions, options, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
