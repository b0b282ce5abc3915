pub mod border;
pub mod shape;
pub mod solid;
pub mod traits;

use std::fmt;

use marker_scan_common::config::MarkerPolicy;

pub use border::BorderClassifier;
pub use shape::BoundedDarkShape;
pub use solid::SolidInterior;
pub use traits::InteriorClassifier;

/// Why a candidate was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Far edge lies beyond the coordinate range.
    OutOfRange,
    TooSmall,
    BorderEmpty,
    BorderTooLight,
    /// Nothing left after stripping the edge.
    DegenerateInterior,
    InteriorEmpty,
    InteriorTooDark,
    BackgroundTooDark,
    ShapeWindowEmpty,
    ShapeTooDark,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::OutOfRange => "out_of_range",
            Rejection::TooSmall => "too_small",
            Rejection::BorderEmpty => "border_empty",
            Rejection::BorderTooLight => "border_too_light",
            Rejection::DegenerateInterior => "degenerate_interior",
            Rejection::InteriorEmpty => "interior_empty",
            Rejection::InteriorTooDark => "interior_too_dark",
            Rejection::BackgroundTooDark => "background_too_dark",
            Rejection::ShapeWindowEmpty => "shape_window_empty",
            Rejection::ShapeTooDark => "shape_too_dark",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one classification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// `Accepted` when `ok`, otherwise rejected for `reason`.
    pub fn check(ok: bool, reason: Rejection) -> Self {
        if ok {
            Verdict::Accepted
        } else {
            Verdict::Rejected(reason)
        }
    }
}

/// Build the interior strategy for a configured policy.
pub fn for_policy(policy: MarkerPolicy) -> Box<dyn InteriorClassifier> {
    match policy {
        MarkerPolicy::SolidInterior => Box::new(SolidInterior::default()),
        MarkerPolicy::BoundedDarkShape => Box::new(BoundedDarkShape::default()),
    }
}
