//! Voice Canvas - draw on a window with your voice

use clap::Parser;
use tracing::info;
use winit::event_loop::EventLoop;

use voice_canvas::app::App;
use voice_canvas::audio::MicrophoneBackend;
use voice_canvas::cli::Args;
use voice_canvas::logging;
use voice_canvas::params::SessionConfig;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.log_level)?;

    if args.list_devices {
        for device in MicrophoneBackend::list_devices()? {
            let marker = if device.is_default { " (default)" } else { "" };
            println!(
                "{}{}  channels: {}  rates: {:?}",
                device.name, marker, device.max_channels, device.supported_sample_rates
            );
        }
        return Ok(());
    }

    info!("Voice Canvas starting");

    let backend = MicrophoneBackend::new(args.device.clone());
    let mut app = App::new(backend, SessionConfig::default(), args.render_config());
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
