use camview::app::{self, AppError, AppOptions};
use camview::cli::{apply_overrides, handle_config_action, list_devices, Args, Command};
use camview::config::{Config, Source};
use clap::Parser;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

/// Open the viewer for the configured source.
fn run_viewer(config: Config) -> Result<(), AppError> {
    let options = AppOptions {
        title: config.window.title,
        width: config.window.width,
        height: config.window.height,
        device: config.camera.device,
        open_settings_on_denial: config.permissions.open_settings_on_denial,
    };

    match config.camera.source.unwrap_or_default() {
        Source::Pattern => app::run(
            camview::camera::PatternBackend::default(),
            camview::permissions::AlwaysAuthorized,
            options,
        ),
        #[cfg(feature = "native-camera")]
        Source::Camera => app::run(
            camview::camera::NativeBackend,
            camview::permissions::NativePermissions,
            options,
        ),
        #[cfg(not(feature = "native-camera"))]
        Source::Camera => Err(camview::camera::CameraError::QueryFailed(
            "camview was built without the native-camera feature; use --source pattern"
                .to_string(),
        )
        .into()),
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    apply_overrides(&mut config, &args);

    match args.command {
        Some(Command::ListDevices) => {
            if let Err(e) = list_devices(config.camera.source.unwrap_or_default()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Command::Config { action }) => {
            handle_config_action(action, &config, args.config.as_deref());
        }
        Some(Command::Run) | None => {
            if let Err(e) = run_viewer(config) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
