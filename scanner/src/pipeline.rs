use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use marker_scan_common::config::{Config, PanelType};
use marker_scan_common::frame::Frame;
use marker_scan_common::pixel::PixelFormat;
use marker_scan_detector::{RectEvaluator, RectFinder};
use tracing::{debug, error, info};

use crate::display::{centered_offset, DisplayError};
use crate::fps::{FpsClock, FpsSink};
use crate::media::MediaError;
use crate::render::{RenderError, Renderer};
use crate::session::MediaSession;
use crate::source::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("frame source: {0}")]
    Source(#[from] SourceError),
    #[error("renderer: {0}")]
    Render(#[from] RenderError),
    #[error("display: {0}")]
    Display(#[from] DisplayError),
    #[error("media: {0}")]
    Media(#[from] MediaError),
}

/// Cooperative stop flag, checked once per frame.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Cancelled,
    SourceExhausted,
    FrameLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    pub accepted: u64,
    pub exit: ExitReason,
}

/// The knobs the loop needs, flattened out of [`Config`].
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub frame_width: u32,
    pub frame_height: u32,
    pub pixel_format: PixelFormat,
    pub panel: PanelType,
    pub panel_width: u32,
    pub panel_height: u32,
    pub preview: bool,
    pub sensitivity: u32,
    pub color: [u8; 3],
    pub thickness: u32,
    pub center_marker: bool,
    pub marker_radius: u32,
    pub max_frames: Option<u64>,
}

impl LoopSettings {
    pub fn from_config(config: &Config) -> Self {
        let policy = config.detector.policy;
        Self {
            frame_width: config.camera.width,
            frame_height: config.camera.height,
            pixel_format: config.camera.pixel_format,
            panel: config.display.panel,
            panel_width: config.display.width,
            panel_height: config.display.height,
            preview: config.display.preview,
            sensitivity: config.detector.sensitivity_threshold,
            color: config.annotate.color,
            thickness: config.annotate.thickness_for(policy),
            center_marker: config.annotate.center_marker_for(policy),
            marker_radius: config.annotate.marker_radius,
            max_frames: config.run.max_frames,
        }
    }
}

/// Acquire, find, evaluate, annotate, show, report. One frame at a time.
pub struct FrameLoop {
    session: MediaSession,
    finder: Box<dyn RectFinder>,
    evaluator: RectEvaluator,
    renderer: Box<dyn Renderer>,
    fps_sink: Box<dyn FpsSink>,
    settings: LoopSettings,
}

impl FrameLoop {
    pub fn new(
        session: MediaSession,
        finder: Box<dyn RectFinder>,
        evaluator: RectEvaluator,
        renderer: Box<dyn Renderer>,
        fps_sink: Box<dyn FpsSink>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            session,
            finder,
            evaluator,
            renderer,
            fps_sink,
            settings,
        }
    }

    /// Runs until cancelled, out of frames, at the frame limit, or failed.
    /// The session is torn down before this returns, whichever way it ends.
    pub fn run(mut self, cancel: &CancelToken) -> Result<LoopSummary, LoopError> {
        let result = self.run_inner(cancel);
        if let Err(e) = &result {
            error!(error = %e, "frame loop failed");
        }
        self.session.teardown();
        result
    }

    fn run_inner(&mut self, cancel: &CancelToken) -> Result<LoopSummary, LoopError> {
        let s = &self.settings;
        self.session
            .source_mut()
            .configure(s.frame_width, s.frame_height, s.pixel_format)?;
        self.session
            .display_mut()
            .init(s.panel, s.panel_width, s.panel_height, s.preview)?;
        self.session.media_mut().init()?;
        self.session.source_mut().start()?;

        info!(
            source = self.session.source_mut().name(),
            policy = self.evaluator.policy_name(),
            sensitivity = s.sensitivity,
            "frame loop started"
        );

        let mut clock = FpsClock::new();
        let mut frames = 0u64;
        let mut accepted = 0u64;

        let exit = loop {
            if cancel.is_cancelled() {
                break ExitReason::Cancelled;
            }
            if self.settings.max_frames.is_some_and(|max| frames >= max) {
                break ExitReason::FrameLimit;
            }

            clock.tick();
            let mut frame = match self.session.source_mut().next_frame() {
                Ok(frame) => frame,
                Err(SourceError::Exhausted) => break ExitReason::SourceExhausted,
                Err(e) => return Err(e.into()),
            };

            accepted += self.process(&mut frame)? as u64;

            let (x, y) = centered_offset(
                (self.settings.panel_width, self.settings.panel_height),
                (frame.width(), frame.height()),
            );
            self.session.display_mut().show(&frame, x, y)?;

            frames += 1;
            self.fps_sink.report_fps(clock.fps());
        };

        info!(frames, accepted, exit = ?exit, "frame loop finished");
        Ok(LoopSummary {
            frames,
            accepted,
            exit,
        })
    }

    /// Evaluates every candidate, then annotates the accepted ones. Returns
    /// how many were accepted.
    fn process(&self, frame: &mut Frame) -> Result<usize, RenderError> {
        let s = &self.settings;
        let candidates = self.finder.find_rects(frame, s.sensitivity);
        let report = self.evaluator.scan(frame, &candidates);
        debug!(
            seq = frame.seq,
            candidates = report.candidates,
            accepted = report.accepted.len(),
            rejected = report.rejected_count(),
            "frame scanned"
        );

        for rect in &report.accepted {
            self.renderer
                .draw_outline(frame, rect, s.color, s.thickness)?;
            if s.center_marker {
                self.renderer
                    .draw_filled_marker(frame, rect.center(), s.marker_radius, s.color)?;
            }
        }
        Ok(report.accepted.len())
    }
}
