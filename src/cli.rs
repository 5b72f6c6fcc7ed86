//! Command-line argument parsing.

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use crate::params::RenderConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "voice-canvas")]
#[command(about = "Draw with your voice: pitch steers, volume sets stroke size", long_about = None)]
pub struct Args {
    /// Input device name (default: system default input)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Print available input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Initial window width (logical pixels)
    #[arg(long, value_name = "PX", default_value_t = 1280)]
    pub width: u32,

    /// Initial window height (logical pixels)
    #[arg(long, value_name = "PX", default_value_t = 720)]
    pub height: u32,

    /// Log level used when RUST_LOG is unset: off, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LevelFilter,

    /// Hide the frequency bar chart
    #[arg(long)]
    pub no_visualizer: bool,
}

impl Args {
    /// Window configuration from command-line arguments
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width.max(1),
            window_height: self.height.max(1),
            show_visualizer: !self.no_visualizer,
            ..RenderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["voice-canvas"]).unwrap();

        assert_eq!(args.device, None);
        assert!(!args.list_devices);
        assert_eq!(args.log_level, LevelFilter::INFO);

        let config = args.render_config();
        assert_eq!((config.window_width, config.window_height), (1280, 720));
        assert!(config.show_visualizer);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "voice-canvas",
            "--device",
            "USB Mic",
            "--width",
            "640",
            "--height",
            "480",
            "--log-level",
            "debug",
            "--no-visualizer",
        ])
        .unwrap();

        assert_eq!(args.device.as_deref(), Some("USB Mic"));
        assert_eq!(args.log_level, LevelFilter::DEBUG);

        let config = args.render_config();
        assert_eq!((config.window_width, config.window_height), (640, 480));
        assert!(!config.show_visualizer);
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Args::try_parse_from(["voice-canvas", "--log-level", "loud"]).is_err());
    }
}
