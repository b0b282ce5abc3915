use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbImage;
use marker_scan_common::frame::{Frame, FrameError, Rect};
use marker_scan_common::pixel::{EncodedPixel, PixelFormat};
use marker_scan_common::scene::{MarkerSpec, Scene};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("frame source used before configure()")]
    NotConfigured,
    #[error("frame source used before start()")]
    NotStarted,
    #[error("frame source has no more frames")]
    Exhausted,
    #[error("no image files in {0}")]
    EmptyDirectory(String),
    #[error("failed to read {0}: {1}")]
    Io(String, std::io::Error),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Camera-like producer of frames.
pub trait FrameSource: Send {
    fn configure(&mut self, width: u32, height: u32, format: PixelFormat)
        -> Result<(), SourceError>;

    fn start(&mut self) -> Result<(), SourceError>;

    /// Next frame. `Err(SourceError::Exhausted)` marks a clean end of stream.
    fn next_frame(&mut self) -> Result<Frame, SourceError>;

    /// Safe to call in any state, including before `start`.
    fn stop(&mut self) -> Result<(), SourceError>;

    fn name(&self) -> &str {
        "unnamed"
    }
}

#[derive(Debug, Clone, Copy)]
struct Geometry {
    width: u32,
    height: u32,
    format: PixelFormat,
}

/// Encode an RGB image into a frame of the given layout.
pub fn frame_from_rgb(img: &RgbImage, format: PixelFormat) -> Result<Frame, FrameError> {
    let pixels = img
        .pixels()
        .map(|p| EncodedPixel::from_rgb(p.0, format))
        .collect();
    Frame::new(img.width(), img.height(), format, pixels)
}

/// Generates a moving test scene: a solid marker, a marker with a glyph and a
/// filled dark square that should never be accepted.
pub struct SyntheticSource {
    geometry: Option<Geometry>,
    running: bool,
    seq: u64,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            geometry: None,
            running: false,
            seq: 0,
        }
    }

    fn render(&self, g: Geometry) -> Frame {
        let (w, h) = (g.width as i32, g.height as i32);
        let short = w.min(h);

        let solid_side = (short / 4).max(24);
        let glyph_side = (short / 3).max(36);
        let block_side = (short / 6).max(12);

        // Drift two pixels per frame, wrapping inside the frame.
        let seq = self.seq;
        let wrap = |offset: i32, side: i32| {
            let span = (w - side).max(1) as u64;
            ((offset.max(0) as u64 % span + seq % span * 2) % span) as i32
        };

        let mut scene = Scene::new(g.width, g.height, g.format, 235);
        scene
            .marker(&MarkerSpec::solid(Rect::new(
                wrap(0, solid_side),
                h / 10,
                solid_side,
                solid_side,
            )))
            .marker(&MarkerSpec::with_glyph(
                Rect::new(
                    wrap(w / 2, glyph_side),
                    h - glyph_side - h / 12,
                    glyph_side,
                    glyph_side,
                ),
                glyph_side / 4,
            ))
            .fill_rect(
                Rect::new(
                    wrap(w / 3, block_side),
                    h / 10 + solid_side + 4,
                    block_side,
                    block_side,
                ),
                15,
            );
        scene.into_frame().with_seq(self.seq)
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticSource {
    fn configure(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<(), SourceError> {
        self.geometry = Some(Geometry {
            width,
            height,
            format,
        });
        Ok(())
    }

    fn start(&mut self) -> Result<(), SourceError> {
        if self.geometry.is_none() {
            return Err(SourceError::NotConfigured);
        }
        self.running = true;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame, SourceError> {
        let g = self.geometry.ok_or(SourceError::NotConfigured)?;
        if !self.running {
            return Err(SourceError::NotStarted);
        }
        let frame = self.render(g);
        self.seq = self.seq.wrapping_add(1);
        Ok(frame)
    }

    fn stop(&mut self) -> Result<(), SourceError> {
        self.running = false;
        Ok(())
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Replays image files from a directory in name order, resized to the
/// configured frame size.
pub struct ImageDirSource {
    dir: PathBuf,
    loop_frames: bool,
    geometry: Option<Geometry>,
    files: Vec<PathBuf>,
    cursor: usize,
    seq: u64,
}

impl ImageDirSource {
    pub fn new(dir: impl Into<PathBuf>, loop_frames: bool) -> Self {
        Self {
            dir: dir.into(),
            loop_frames,
            geometry: None,
            files: Vec::new(),
            cursor: 0,
            seq: 0,
        }
    }

    fn list_images(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| SourceError::Io(dir.display().to_string(), e))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn load(path: &Path, g: Geometry) -> Result<Frame, SourceError> {
        let img = image::open(path).map_err(|e| SourceError::Decode {
            path: path.display().to_string(),
            source: e,
        })?;
        let rgb = img
            .resize_exact(g.width, g.height, FilterType::Nearest)
            .to_rgb8();
        Ok(frame_from_rgb(&rgb, g.format)?)
    }
}

impl FrameSource for ImageDirSource {
    fn configure(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<(), SourceError> {
        self.geometry = Some(Geometry {
            width,
            height,
            format,
        });
        Ok(())
    }

    fn start(&mut self) -> Result<(), SourceError> {
        if self.geometry.is_none() {
            return Err(SourceError::NotConfigured);
        }
        let files = Self::list_images(&self.dir)?;
        if files.is_empty() {
            return Err(SourceError::EmptyDirectory(self.dir.display().to_string()));
        }
        info!(
            dir = %self.dir.display(),
            files = files.len(),
            loop_frames = self.loop_frames,
            "image directory source started"
        );
        self.files = files;
        self.cursor = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame, SourceError> {
        let g = self.geometry.ok_or(SourceError::NotConfigured)?;
        if self.files.is_empty() {
            return Err(SourceError::NotStarted);
        }
        if self.cursor >= self.files.len() {
            if !self.loop_frames {
                return Err(SourceError::Exhausted);
            }
            self.cursor = 0;
        }
        let path = &self.files[self.cursor];
        debug!(path = %path.display(), seq = self.seq, "loading frame");
        let frame = Self::load(path, g)?.with_seq(self.seq);
        self.cursor += 1;
        self.seq += 1;
        Ok(frame)
    }

    fn stop(&mut self) -> Result<(), SourceError> {
        self.files.clear();
        self.cursor = 0;
        Ok(())
    }

    fn name(&self) -> &str {
        "directory"
    }
}
