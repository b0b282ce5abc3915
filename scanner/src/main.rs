mod display;
mod fps;
mod media;
mod pipeline;
mod render;
mod session;
mod source;

use display::{DisplaySink, NullDisplay, PanelDisplay};
use fps::TracingFps;
use marker_scan_common::config::{Config, SourceKind};
use marker_scan_detector::{DarkOutlineFinder, LumaSampler, RectEvaluator};
use media::OutputMedia;
use pipeline::{CancelToken, FrameLoop, LoopSettings};
use render::FrameRenderer;
use session::MediaSession;
use source::{FrameSource, ImageDirSource, SyntheticSource};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("scanner.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        source = ?config.camera.source,
        width = config.camera.width,
        height = config.camera.height,
        pixel_format = ?config.camera.pixel_format,
        policy = ?config.detector.policy,
        sensitivity = config.detector.sensitivity_threshold,
        panel = ?config.display.panel,
        output_dir = %config.display.output_dir.display(),
        "starting marker-scan"
    );

    let source: Box<dyn FrameSource> = match config.camera.source {
        SourceKind::Synthetic => Box::new(SyntheticSource::new()),
        SourceKind::Directory => Box::new(ImageDirSource::new(
            &config.camera.directory,
            config.camera.loop_frames,
        )),
    };

    // Nothing would be written, so skip compositing entirely.
    let display: Box<dyn DisplaySink> = if !config.display.preview && config.display.save_every == 0
    {
        Box::new(NullDisplay::default())
    } else {
        Box::new(PanelDisplay::new(
            &config.display.output_dir,
            config.display.save_every,
        ))
    };

    let session = MediaSession::new(
        source,
        display,
        Box::new(OutputMedia::new(&config.display.output_dir)),
    );

    let luma = LumaSampler::new(config.detector.rgb565_scaling);
    let frame_loop = FrameLoop::new(
        session,
        Box::new(DarkOutlineFinder::new(config.detector.dark_level, luma)),
        RectEvaluator::from_config(&config.detector),
        Box::new(FrameRenderer),
        Box::new(TracingFps::new(config.run.fps_report_every)),
        LoopSettings::from_config(&config),
    );

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, stopping after the current frame");
                on_signal.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    let result = tokio::task::spawn_blocking(move || frame_loop.run(&cancel)).await;
    match result {
        Ok(Ok(summary)) => {
            info!(
                frames = summary.frames,
                accepted = summary.accepted,
                exit = ?summary.exit,
                "marker-scan stopped"
            );
        }
        Ok(Err(e)) => {
            error!(error = %e, "marker-scan stopped on error");
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "frame loop thread panicked");
            std::process::exit(1);
        }
    }
}
