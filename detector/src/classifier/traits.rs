use marker_scan_common::frame::Rect;

use super::Verdict;
use crate::region::RegionSampler;

/// Interior rule plugged into the rectangle evaluator.
///
/// Each policy also owns the geometry that goes with it: the smallest
/// rectangle it will look at and how densely the border is walked.
pub trait InteriorClassifier: Send + Sync {
    /// Minimum accepted width and height.
    fn min_size(&self) -> (i32, i32);

    /// Border samples are taken every `max(1, side / divisor)` pixels.
    fn border_divisor(&self) -> i32;

    /// Judge the interior left after stripping the edge. `inner` is never empty.
    fn classify(&self, sampler: &RegionSampler<'_>, inner: &Rect) -> Verdict;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
