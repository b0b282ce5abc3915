use std::path::PathBuf;

use image::{Rgb, RgbImage};
use marker_scan_common::config::PanelType;
use marker_scan_common::frame::Frame;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("display used before init()")]
    NotInitialized,
    #[error("invalid panel size {0}x{1}")]
    InvalidPanel(u32, u32),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: image::ImageError,
    },
}

/// Where annotated frames end up.
pub trait DisplaySink: Send {
    fn init(
        &mut self,
        panel: PanelType,
        width: u32,
        height: u32,
        preview: bool,
    ) -> Result<(), DisplayError>;

    /// Place `frame` with its top-left corner at `(x, y)` on the panel.
    fn show(&mut self, frame: &Frame, x: i32, y: i32) -> Result<(), DisplayError>;

    /// Safe to call in any state, including before `init`.
    fn deinit(&mut self) -> Result<(), DisplayError>;
}

/// Top-left offset that centers a frame on the panel, rounded to the nearest pixel.
pub fn centered_offset(panel: (u32, u32), frame: (u32, u32)) -> (i32, i32) {
    let axis = |p: u32, f: u32| ((p as f64 - f as f64) / 2.0).round() as i32;
    (axis(panel.0, frame.0), axis(panel.1, frame.1))
}

/// A panel-sized canvas rendered to PNG files.
///
/// With preview on, every shown frame overwrites `preview.png`. With
/// `save_every = n > 0`, every n-th frame is also archived under its
/// snapshot name.
pub struct PanelDisplay {
    output_dir: PathBuf,
    save_every: u64,
    canvas: Option<RgbImage>,
    preview: bool,
    shown: u64,
}

impl PanelDisplay {
    pub fn new(output_dir: impl Into<PathBuf>, save_every: u64) -> Self {
        Self {
            output_dir: output_dir.into(),
            save_every,
            canvas: None,
            preview: false,
            shown: 0,
        }
    }

    pub fn shown(&self) -> u64 {
        self.shown
    }

    fn blit(canvas: &mut RgbImage, frame: &Frame, x: i32, y: i32) {
        for pixel in canvas.pixels_mut() {
            *pixel = Rgb([0, 0, 0]);
        }
        let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
        for fy in 0..frame.height() as i32 {
            let py = y + fy;
            if py < 0 || py >= ch {
                continue;
            }
            for fx in 0..frame.width() as i32 {
                let px = x + fx;
                if px < 0 || px >= cw {
                    continue;
                }
                canvas.put_pixel(px as u32, py as u32, Rgb(frame.sample(fx, fy).to_rgb8()));
            }
        }
    }

    fn write(canvas: &RgbImage, path: PathBuf) -> Result<(), DisplayError> {
        canvas.save(&path).map_err(|e| DisplayError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

impl DisplaySink for PanelDisplay {
    fn init(
        &mut self,
        panel: PanelType,
        width: u32,
        height: u32,
        preview: bool,
    ) -> Result<(), DisplayError> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidPanel(width, height));
        }
        self.canvas = Some(RgbImage::new(width, height));
        self.preview = preview;
        self.shown = 0;
        info!(
            ?panel,
            width,
            height,
            preview,
            output_dir = %self.output_dir.display(),
            "display initialized"
        );
        Ok(())
    }

    fn show(&mut self, frame: &Frame, x: i32, y: i32) -> Result<(), DisplayError> {
        let canvas = self.canvas.as_mut().ok_or(DisplayError::NotInitialized)?;
        Self::blit(canvas, frame, x, y);
        self.shown += 1;

        if self.preview {
            Self::write(canvas, self.output_dir.join("preview.png"))?;
        }
        if self.save_every > 0 && self.shown % self.save_every == 0 {
            let path = self
                .output_dir
                .join(format!("{}.png", frame.snapshot_name("frame_")));
            debug!(path = %path.display(), "archiving frame");
            Self::write(canvas, path)?;
        }
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), DisplayError> {
        if self.canvas.take().is_some() {
            info!(shown = self.shown, "display released");
        }
        Ok(())
    }
}

/// Discards frames. Used when nothing would be written anyway.
#[derive(Debug, Default)]
pub struct NullDisplay {
    initialized: bool,
    shown: u64,
}

impl DisplaySink for NullDisplay {
    fn init(
        &mut self,
        _panel: PanelType,
        _width: u32,
        _height: u32,
        _preview: bool,
    ) -> Result<(), DisplayError> {
        self.initialized = true;
        Ok(())
    }

    fn show(&mut self, _frame: &Frame, _x: i32, _y: i32) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        self.shown += 1;
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), DisplayError> {
        if self.initialized {
            debug!(shown = self.shown, "null display released");
        }
        self.initialized = false;
        Ok(())
    }
}
