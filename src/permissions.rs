//! Camera permission checks.
//!
//! The gate runs before any capture starts: authorized → start, not yet
//! determined → ask and wait, denied or restricted → tell the user where to
//! grant access.

use std::process::{Command, Stdio};

/// System Settings location of the camera privacy pane.
pub const CAMERA_SETTINGS_PATH: &str = "System Settings > Privacy & Security > Camera";

/// Deep link that opens the camera privacy pane.
pub const CAMERA_SETTINGS_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Camera";

/// What the platform reports about camera access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    Restricted,
    NotDetermined,
}

/// Platform permission API.
pub trait PermissionProvider {
    fn status(&self) -> AuthorizationStatus;

    /// Ask the user for access. `on_complete` may run on any thread.
    fn request_access(&self, on_complete: Box<dyn FnOnce(bool) + Send + 'static>);
}

/// Provider for sources that need no permission, such as the test pattern.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAuthorized;

impl PermissionProvider for AlwaysAuthorized {
    fn status(&self) -> AuthorizationStatus {
        AuthorizationStatus::Authorized
    }

    fn request_access(&self, on_complete: Box<dyn FnOnce(bool) + Send + 'static>) {
        on_complete(true);
    }
}

/// Provider backed by the platform camera stack.
#[cfg(feature = "native-camera")]
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePermissions;

#[cfg(feature = "native-camera")]
impl PermissionProvider for NativePermissions {
    fn status(&self) -> AuthorizationStatus {
        if crate::camera::native::access_granted() {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::NotDetermined
        }
    }

    fn request_access(&self, on_complete: Box<dyn FnOnce(bool) + Send + 'static>) {
        let once = std::sync::Mutex::new(Some(on_complete));
        crate::camera::native::request_access(move |granted| {
            if let Some(callback) = once.lock().ok().and_then(|mut c| c.take()) {
                callback(granted);
            }
        });
    }
}

/// Where the permission flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Unknown,
    Authorized,
    Denied,
    Restricted,
    /// Waiting for the user to answer the access request
    Pending,
    /// Authorized and capture has started
    Running,
}

/// What the application should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAction {
    StartCapture,
    RequestAccess,
    ShowAlert,
    /// Nothing to do in the current state
    Wait,
}

/// Drives the permission state machine.
#[derive(Debug)]
pub struct PermissionGate {
    state: PermissionState,
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self {
            state: PermissionState::Unknown,
        }
    }
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Translate the platform status into the next action.
    pub fn check(&mut self, status: AuthorizationStatus) -> PermissionAction {
        if self.state != PermissionState::Unknown {
            return PermissionAction::Wait;
        }

        let (state, action) = match status {
            AuthorizationStatus::Authorized => {
                (PermissionState::Authorized, PermissionAction::StartCapture)
            }
            AuthorizationStatus::NotDetermined => {
                (PermissionState::Pending, PermissionAction::RequestAccess)
            }
            AuthorizationStatus::Denied => (PermissionState::Denied, PermissionAction::ShowAlert),
            AuthorizationStatus::Restricted => {
                (PermissionState::Restricted, PermissionAction::ShowAlert)
            }
        };
        self.transition(state);
        action
    }

    /// Handle the answer to an access request.
    pub fn resolve(&mut self, granted: bool) -> PermissionAction {
        if self.state != PermissionState::Pending {
            return PermissionAction::Wait;
        }

        if granted {
            self.transition(PermissionState::Authorized);
            PermissionAction::StartCapture
        } else {
            self.transition(PermissionState::Denied);
            PermissionAction::ShowAlert
        }
    }

    /// Record that capture is up after authorization.
    pub fn mark_running(&mut self) {
        if self.state == PermissionState::Authorized {
            self.transition(PermissionState::Running);
        }
    }

    fn transition(&mut self, next: PermissionState) {
        log::info!("Camera permission: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Error type for permission verification failures
#[derive(Debug)]
pub struct PermissionError {
    pub status: AuthorizationStatus,
    /// Additional details about the error
    pub details: Option<String>,
}

impl std::fmt::Display for PermissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Camera access denied.\n\n\
            This app does not have access to the camera. Please grant permission in:\n  {}\n\n\
            You can open System Settings directly by running:\n  open \"{}\"",
            CAMERA_SETTINGS_PATH, CAMERA_SETTINGS_URL
        )?;

        if let Some(ref details) = self.details {
            write!(f, "\n\nDetails: {}", details)?;
        }

        Ok(())
    }
}

impl std::error::Error for PermissionError {}

/// Tell the user camera access is missing, optionally opening the settings pane.
pub fn show_permission_alert(status: AuthorizationStatus, open_settings: bool) {
    let details = match status {
        AuthorizationStatus::Restricted => Some("Access is restricted on this device".to_string()),
        _ => None,
    };
    log::error!("{}", PermissionError { status, details });

    if open_settings {
        if let Err(e) = open_privacy_settings() {
            log::warn!("Failed to open camera privacy settings: {}", e);
        }
    }
}

/// Open the camera privacy pane in System Settings.
pub fn open_privacy_settings() -> std::io::Result<()> {
    if !cfg!(target_os = "macos") {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "privacy settings can only be opened on macOS",
        ));
    }

    let status = Command::new("open")
        .arg(CAMERA_SETTINGS_URL)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("open exited with {}", status)))
    }
}
