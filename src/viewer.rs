//! Viewer state independent of the window: permission flow, deferred
//! device enumeration, device menu and capture error handling.
//!
//! Devices are only enumerated once access is granted. Platform camera
//! stacks cannot read device formats before that.

use std::sync::{Arc, Weak};

use crate::app::AppError;
use crate::camera::{CameraError, CaptureBackend, CaptureController, FrameObserver};
use crate::input::KeyAction;
use crate::menu::DeviceMenu;
use crate::permissions::{
    show_permission_alert, AuthorizationStatus, PermissionAction, PermissionGate,
    PermissionProvider, PermissionState,
};

/// Callback handed to the permission provider when access is requested.
pub type AccessCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Startup choices that apply once capture is allowed.
#[derive(Debug, Clone, Default)]
pub struct ViewerOptions {
    /// Menu index to start on
    pub device: Option<usize>,
    pub open_settings_on_denial: bool,
}

pub struct Viewer<B: CaptureBackend, P: PermissionProvider> {
    backend: Option<B>,
    controller: Option<CaptureController<B>>,
    permissions: P,
    gate: PermissionGate,
    status: AuthorizationStatus,
    menu: DeviceMenu,
    observer: Option<Weak<dyn FrameObserver>>,
    options: ViewerOptions,
    alert: Option<AuthorizationStatus>,
}

impl<B: CaptureBackend, P: PermissionProvider> Viewer<B, P> {
    pub fn new(backend: B, permissions: P, options: ViewerOptions) -> Self {
        Self {
            backend: Some(backend),
            controller: None,
            permissions,
            gate: PermissionGate::new(),
            status: AuthorizationStatus::NotDetermined,
            menu: DeviceMenu::new(&[]),
            observer: None,
            options,
            alert: None,
        }
    }

    /// Register the frame observer without taking ownership of it.
    pub fn set_observer<O: FrameObserver + 'static>(&mut self, observer: &Arc<O>) {
        let weak: Weak<O> = Arc::downgrade(observer);
        let weak: Weak<dyn FrameObserver> = weak;
        if let Some(controller) = &self.controller {
            controller.register_observer(weak.clone());
        }
        self.observer = Some(weak);
    }

    /// The capture controller, once access was granted.
    pub fn controller(&self) -> Option<&CaptureController<B>> {
        self.controller.as_ref()
    }

    pub fn menu(&self) -> &DeviceMenu {
        &self.menu
    }

    pub fn permission_state(&self) -> PermissionState {
        self.gate.state()
    }

    /// The status of the last access alert shown, if any.
    pub fn alert(&self) -> Option<AuthorizationStatus> {
        self.alert
    }

    pub fn is_running(&self) -> bool {
        self.controller.as_ref().is_some_and(|c| c.is_running())
    }

    /// Check access and start capture if it is already granted.
    ///
    /// `on_access` is passed to the provider when access must be requested;
    /// its answer goes to [`resolve_access`](Self::resolve_access).
    pub fn begin(&mut self, on_access: AccessCallback) -> Result<(), AppError> {
        self.status = self.permissions.status();
        let action = self.gate.check(self.status);
        self.apply(action, Some(on_access))
    }

    /// Continue after the user answered the access request.
    pub fn resolve_access(&mut self, granted: bool) -> Result<(), AppError> {
        if !granted {
            self.status = AuthorizationStatus::Denied;
        }
        let action = self.gate.resolve(granted);
        self.apply(action, None)
    }

    /// Handle a device menu key. Returns `true` when the selection changed.
    ///
    /// Choosing the current entry again retries it while nothing is running.
    pub fn select(&mut self, action: KeyAction) -> Result<bool, AppError> {
        if self.controller.is_none() {
            return Ok(false);
        }

        let retry = !self.is_running();
        let selected = match action {
            KeyAction::SelectDevice(index)
                if retry && index == self.menu.selected() && index < self.menu.len() =>
            {
                Some(index)
            }
            KeyAction::SelectDevice(index) => self.menu.select(index),
            KeyAction::NextDevice => self.menu.select_next(),
            KeyAction::PreviousDevice => self.menu.select_previous(),
            KeyAction::Quit | KeyAction::None => None,
        };
        let Some(index) = selected else {
            return Ok(false);
        };
        let Some(controller) = self.controller.as_mut() else {
            return Ok(false);
        };

        let device = controller.devices()[index].clone();
        let result = controller.switch_device(&device);
        let active = controller.active_device_index();
        self.menu.select(active);

        match result {
            Ok(()) => self.gate.mark_running(),
            Err(e) => self.capture_failed(e)?,
        }
        Ok(true)
    }

    /// Stop capture and log the session counters.
    pub fn stop(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.stop();
            let stats = controller.stats();
            log::info!(
                "Delivered {} frame(s), dropped {}",
                stats.delivered(),
                stats.dropped()
            );
        }
    }

    fn apply(
        &mut self,
        action: PermissionAction,
        on_access: Option<AccessCallback>,
    ) -> Result<(), AppError> {
        match action {
            PermissionAction::StartCapture => self.start_capture(),
            PermissionAction::RequestAccess => {
                if let Some(on_access) = on_access {
                    log::info!("Requesting camera access");
                    self.permissions.request_access(on_access);
                }
                Ok(())
            }
            PermissionAction::ShowAlert => {
                self.show_alert(self.status);
                Ok(())
            }
            PermissionAction::Wait => Ok(()),
        }
    }

    fn start_capture(&mut self) -> Result<(), AppError> {
        self.ensure_controller()?;
        let Some(controller) = self.controller.as_mut() else {
            return Ok(());
        };

        match controller.start() {
            Ok(()) => {
                self.gate.mark_running();
                Ok(())
            }
            Err(e) => self.capture_failed(e),
        }
    }

    /// Enumerate devices and build the menu on first use.
    fn ensure_controller(&mut self) -> Result<(), AppError> {
        if self.controller.is_some() {
            return Ok(());
        }
        let Some(backend) = self.backend.take() else {
            return Err(CameraError::NoDevices.into());
        };

        let mut controller = CaptureController::new(backend)?;
        if let Some(observer) = &self.observer {
            controller.register_observer(observer.clone());
        }

        let mut menu = DeviceMenu::new(controller.devices());
        if let Some(index) = self.options.device {
            controller.select_device(index)?;
            menu.select(index);
        }

        self.menu = menu;
        self.controller = Some(controller);
        Ok(())
    }

    /// Decide whether a capture error ends the viewer.
    fn capture_failed(&mut self, error: CameraError) -> Result<(), AppError> {
        match error {
            CameraError::NoFormats(_) => Err(error.into()),
            CameraError::PermissionDenied => {
                self.status = AuthorizationStatus::Denied;
                self.show_alert(AuthorizationStatus::Denied);
                Ok(())
            }
            // Logged by the controller; the window stays up
            _ => Ok(()),
        }
    }

    fn show_alert(&mut self, status: AuthorizationStatus) {
        show_permission_alert(status, self.options.open_settings_on_denial);
        self.alert = Some(status);
    }
}
