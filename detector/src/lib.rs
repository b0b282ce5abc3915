//! Marker classification for candidate rectangles.
//!
//! A candidate is a marker when its outermost edges are dark and its interior
//! matches the configured rule. The pipeline for one rectangle is:
//!
//! 1. size gate ([`classifier::InteriorClassifier::min_size`]);
//! 2. border sampling and the [`classifier::BorderClassifier`];
//! 3. interior sampling after a fixed edge inset, judged by the policy's
//!    [`classifier::InteriorClassifier`].
//!
//! All reads go through [`luma::LumaSampler`], which maps missing and
//! out-of-bounds pixels to black, so evaluation never fails: it only accepts
//! or rejects.

pub mod classifier;
pub mod evaluator;
pub mod luma;
pub mod rects;
pub mod region;

pub use classifier::{Rejection, Verdict};
pub use evaluator::{RectEvaluator, ScanReport};
pub use luma::{luminance, LumaSampler};
pub use rects::{DarkOutlineFinder, RectFinder};
