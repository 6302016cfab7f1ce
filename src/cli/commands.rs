//! Subcommand handlers for list-devices and config actions.

use std::path::Path;

use super::args::{Args, ConfigAction};
use crate::camera::{CameraError, CaptureBackend, PatternBackend};
use crate::config::{default_path as get_config_path, Config, Source};
use crate::menu::print_devices;
use crate::permissions::CAMERA_SETTINGS_PATH;

const DEFAULT_CONFIG: &str = r#"# camview configuration

[camera]
# Device index from `camview list-devices`
device = 0
# Frame source: camera, pattern
# source = "camera"

[window]
title = "camview"
width = 960
height = 540

[permissions]
# Open System Settings when camera access is denied
open_settings_on_denial = false
"#;

/// Layer command-line flags over the loaded configuration.
pub fn apply_overrides(config: &mut Config, args: &Args) {
    if args.device.is_some() {
        config.camera.device = args.device;
    }
    if args.source.is_some() {
        config.camera.source = args.source;
    }
    if args.open_settings {
        config.permissions.open_settings_on_denial = true;
    }
}

/// List devices for `source` and print them to stdout.
pub fn list_devices(source: Source) -> Result<(), CameraError> {
    let devices = match source {
        Source::Pattern => PatternBackend::default().devices()?,
        #[cfg(feature = "native-camera")]
        Source::Camera => crate::camera::NativeBackend.devices()?,
        #[cfg(not(feature = "native-camera"))]
        Source::Camera => return Err(CameraError::QueryFailed(
            "camview was built without the native-camera feature".to_string(),
        )),
    };

    if devices.is_empty() {
        println!("No cameras found.");
        println!();
        println!("Make sure your camera is connected and permissions are granted.");
        println!("On macOS, grant access in {}.", CAMERA_SETTINGS_PATH);
        return Ok(());
    }

    print_devices(&devices);
    println!();
    println!("Use --device <index> to select a device; * marks the format that will be used.");
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config: &Config, path: Option<&Path>) {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            match config.camera.device {
                Some(device) => println!("  Device: {}", device),
                None => println!("  Device: 0"),
            }
            println!(
                "  Source: {:?}",
                config.camera.source.unwrap_or_default()
            );
            println!(
                "  Window: \"{}\" {}x{}",
                config.window.title, config.window.width, config.window.height
            );
            println!(
                "  Open settings on denial: {}",
                if config.permissions.open_settings_on_denial { "yes" } else { "no" }
            );
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'camview config show' to view current settings.");
                std::process::exit(1);
            }

            if let Err(e) = write_default_config(&config_path) {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }

            println!("Created config file: {}", config_path.display());
        }
    }
}

/// Write the commented default configuration, creating parent directories.
fn write_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
}
