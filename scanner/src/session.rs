use tracing::{error, info, warn};

use crate::display::DisplaySink;
use crate::media::MediaManager;
use crate::source::FrameSource;

/// The capture device, display and shared media of one run.
///
/// Teardown stops capture, then releases the display, then the media
/// resources. It runs once: explicitly through [`MediaSession::teardown`], or
/// from `Drop` if the owner unwound without calling it. Every step is tried
/// even when an earlier one fails.
pub struct MediaSession {
    source: Box<dyn FrameSource>,
    display: Box<dyn DisplaySink>,
    media: Box<dyn MediaManager>,
    torn_down: bool,
}

impl MediaSession {
    pub fn new(
        source: Box<dyn FrameSource>,
        display: Box<dyn DisplaySink>,
        media: Box<dyn MediaManager>,
    ) -> Self {
        Self {
            source,
            display,
            media,
            torn_down: false,
        }
    }

    pub fn source_mut(&mut self) -> &mut dyn FrameSource {
        self.source.as_mut()
    }

    pub fn display_mut(&mut self) -> &mut dyn DisplaySink {
        self.display.as_mut()
    }

    pub fn media_mut(&mut self) -> &mut dyn MediaManager {
        self.media.as_mut()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Returns `false` if any step failed. Later calls do nothing and return `true`.
    pub fn teardown(&mut self) -> bool {
        if self.torn_down {
            return true;
        }
        self.torn_down = true;
        let mut clean = true;

        if let Err(e) = self.source.stop() {
            error!(error = %e, source = self.source.name(), "failed to stop capture");
            clean = false;
        }
        if let Err(e) = self.display.deinit() {
            error!(error = %e, "failed to release display");
            clean = false;
        }
        if let Err(e) = self.media.deinit() {
            error!(error = %e, "failed to release media resources");
            clean = false;
        }

        info!(clean, "session torn down");
        clean
    }
}

impl Drop for MediaSession {
    fn drop(&mut self) {
        if !self.torn_down {
            warn!("session dropped without teardown, tearing down now");
            self.teardown();
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! Recording stand-ins for the boundary traits.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use marker_scan_common::config::PanelType;
    use marker_scan_common::frame::Frame;
    use marker_scan_common::pixel::PixelFormat;

    use crate::display::{DisplayError, DisplaySink};
    use crate::media::{MediaError, MediaManager};
    use crate::source::{FrameSource, SourceError};

    pub type CallLog = Arc<Mutex<Vec<String>>>;

    pub fn log(calls: &CallLog, call: &str) {
        calls.lock().unwrap().push(call.to_string());
    }

    pub fn calls(calls: &CallLog) -> Vec<String> {
        calls.lock().unwrap().clone()
    }

    /// Hands out queued frames, then the queued terminal result.
    pub struct ScriptedSource {
        pub calls: CallLog,
        pub frames: VecDeque<Frame>,
        pub fail_with: Option<fn() -> SourceError>,
        pub fail_stop: bool,
    }

    impl FrameSource for ScriptedSource {
        fn configure(&mut self, _w: u32, _h: u32, _f: PixelFormat) -> Result<(), SourceError> {
            log(&self.calls, "source.configure");
            Ok(())
        }

        fn start(&mut self) -> Result<(), SourceError> {
            log(&self.calls, "source.start");
            Ok(())
        }

        fn next_frame(&mut self) -> Result<Frame, SourceError> {
            match self.frames.pop_front() {
                Some(frame) => Ok(frame),
                None => Err(self.fail_with.map_or(SourceError::Exhausted, |f| f())),
            }
        }

        fn stop(&mut self) -> Result<(), SourceError> {
            log(&self.calls, "source.stop");
            if self.fail_stop {
                return Err(SourceError::NotStarted);
            }
            Ok(())
        }
    }

    /// Keeps every shown frame.
    pub struct RecordingDisplay {
        pub calls: CallLog,
        pub shown: Arc<Mutex<Vec<(Frame, i32, i32)>>>,
        pub fail_show: bool,
    }

    impl DisplaySink for RecordingDisplay {
        fn init(&mut self, _p: PanelType, _w: u32, _h: u32, _preview: bool) -> Result<(), DisplayError> {
            log(&self.calls, "display.init");
            Ok(())
        }

        fn show(&mut self, frame: &Frame, x: i32, y: i32) -> Result<(), DisplayError> {
            if self.fail_show {
                return Err(DisplayError::NotInitialized);
            }
            self.shown.lock().unwrap().push((frame.clone(), x, y));
            Ok(())
        }

        fn deinit(&mut self) -> Result<(), DisplayError> {
            log(&self.calls, "display.deinit");
            Ok(())
        }
    }

    pub struct RecordingMedia {
        pub calls: CallLog,
    }

    impl MediaManager for RecordingMedia {
        fn init(&mut self) -> Result<(), MediaError> {
            log(&self.calls, "media.init");
            Ok(())
        }

        fn deinit(&mut self) -> Result<(), MediaError> {
            log(&self.calls, "media.deinit");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn session(calls: &CallLog, fail_stop: bool) -> MediaSession {
        MediaSession::new(
            Box::new(ScriptedSource {
                calls: calls.clone(),
                frames: VecDeque::new(),
                fail_with: None,
                fail_stop,
            }),
            Box::new(RecordingDisplay {
                calls: calls.clone(),
                shown: Arc::default(),
                fail_show: false,
            }),
            Box::new(RecordingMedia {
                calls: calls.clone(),
            }),
        )
    }

    const ORDER: [&str; 3] = ["source.stop", "display.deinit", "media.deinit"];

    #[test]
    fn teardown_runs_in_order_once() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let mut s = session(&log, false);
        assert!(s.teardown());
        assert!(s.teardown());
        drop(s);
        assert_eq!(calls(&log), ORDER);
    }

    #[test]
    fn failed_step_does_not_skip_the_rest() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let mut s = session(&log, true);
        assert!(!s.teardown());
        assert!(s.is_torn_down());
        assert_eq!(calls(&log), ORDER);
    }

    #[test]
    fn drop_tears_down() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        drop(session(&log, false));
        assert_eq!(calls(&log), ORDER);
    }
}
