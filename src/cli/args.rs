//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Source;

/// Live camera viewer with GPU compositing
#[derive(Parser, Debug)]
#[command(name = "camview")]
#[command(version, about = "Live camera viewer", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Device index to start with (from list-devices)
    #[arg(long, short)]
    pub device: Option<usize>,

    /// Frame source
    #[arg(long)]
    pub source: Option<Source>,

    /// Open System Settings when camera access is denied
    #[arg(long)]
    pub open_settings: bool,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the viewer window (default)
    Run,
    /// List devices with their formats
    ListDevices,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["camview"]);
        assert!(args.command.is_none());
        assert!(args.device.is_none());
        assert!(args.source.is_none());
        assert!(!args.open_settings);
        assert!(args.config.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_device_index() {
        let args = Args::parse_from(["camview", "--device", "2"]);
        assert_eq!(args.device, Some(2));

        let args = Args::parse_from(["camview", "-d", "1"]);
        assert_eq!(args.device, Some(1));
    }

    #[test]
    fn test_args_rejects_negative_device() {
        assert!(Args::try_parse_from(["camview", "--device", "-1"]).is_err());
    }

    #[test]
    fn test_args_source_values() {
        let args = Args::parse_from(["camview", "--source", "pattern"]);
        assert_eq!(args.source, Some(Source::Pattern));

        let args = Args::parse_from(["camview", "--source", "camera"]);
        assert_eq!(args.source, Some(Source::Camera));

        assert!(Args::try_parse_from(["camview", "--source", "webcam"]).is_err());
    }

    #[test]
    fn test_args_config_option() {
        let args = Args::parse_from(["camview", "--config", "/tmp/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/config.toml")));

        let args = Args::parse_from(["camview", "-c", "/tmp/test.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    fn test_args_subcommands() {
        let args = Args::parse_from(["camview", "run"]);
        assert!(matches!(args.command, Some(Command::Run)));

        let args = Args::parse_from(["camview", "list-devices"]);
        assert!(matches!(args.command, Some(Command::ListDevices)));
    }

    #[test]
    fn test_args_config_subcommands() {
        let args = Args::parse_from(["camview", "config", "show"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));

        let args = Args::parse_from(["camview", "config", "init"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn test_args_combined_options() {
        let args = Args::parse_from([
            "camview",
            "-v",
            "--device",
            "1",
            "--source",
            "pattern",
            "--open-settings",
            "run",
        ]);
        assert!(args.verbose);
        assert_eq!(args.device, Some(1));
        assert_eq!(args.source, Some(Source::Pattern));
        assert!(args.open_settings);
        assert!(matches!(args.command, Some(Command::Run)));
    }
}
