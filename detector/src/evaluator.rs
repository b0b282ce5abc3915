use std::collections::HashMap;

use marker_scan_common::config::{DetectorConfig, MarkerPolicy};
use marker_scan_common::frame::{Frame, Rect};
use tracing::debug;

use crate::classifier::{self, BorderClassifier, InteriorClassifier, Rejection, Verdict};
use crate::luma::LumaSampler;
use crate::region::{RegionSampler, EDGE_THICKNESS};

/// Decides whether a candidate rectangle is a marker.
///
/// Range check, size gate, then border, then the configured interior rule. Each rectangle
/// is judged on its own; nothing carries over between calls.
pub struct RectEvaluator {
    border: BorderClassifier,
    interior: Box<dyn InteriorClassifier>,
    luma: LumaSampler,
}

impl RectEvaluator {
    pub fn new(interior: Box<dyn InteriorClassifier>, luma: LumaSampler) -> Self {
        Self {
            border: BorderClassifier::default(),
            interior,
            luma,
        }
    }

    pub fn for_policy(policy: MarkerPolicy, luma: LumaSampler) -> Self {
        Self::new(classifier::for_policy(policy), luma)
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::for_policy(config.policy, LumaSampler::new(config.rgb565_scaling))
    }

    pub fn policy_name(&self) -> &str {
        self.interior.name()
    }

    pub fn luma(&self) -> LumaSampler {
        self.luma
    }

    pub fn evaluate(&self, frame: &Frame, rect: &Rect) -> Verdict {
        if !rect.fits() {
            return Verdict::Rejected(Rejection::OutOfRange);
        }
        let (min_w, min_h) = self.interior.min_size();
        if rect.w < min_w || rect.h < min_h {
            return Verdict::Rejected(Rejection::TooSmall);
        }

        let sampler = RegionSampler::new(frame, self.luma);
        let border = sampler.border(rect, self.interior.border_divisor());
        if let rejected @ Verdict::Rejected(_) = self.border.classify(&border) {
            return rejected;
        }

        match rect.inset(EDGE_THICKNESS) {
            Some(inner) => self.interior.classify(&sampler, &inner),
            None => Verdict::Rejected(Rejection::DegenerateInterior),
        }
    }

    pub fn accepts(&self, frame: &Frame, rect: &Rect) -> bool {
        self.evaluate(frame, rect).is_accepted()
    }

    /// Evaluate every candidate of one frame, keeping accepted ones in input order.
    pub fn scan(&self, frame: &Frame, candidates: &[Rect]) -> ScanReport {
        let mut report = ScanReport {
            candidates: candidates.len(),
            ..ScanReport::default()
        };
        for rect in candidates {
            let verdict = self.evaluate(frame, rect);
            debug!(
                seq = frame.seq,
                rect = %rect,
                policy = self.interior.name(),
                ?verdict,
                "candidate evaluated"
            );
            match verdict {
                Verdict::Accepted => report.accepted.push(*rect),
                Verdict::Rejected(reason) => *report.rejected.entry(reason).or_default() += 1,
            }
        }
        report
    }
}

/// Result of evaluating all candidates in one frame.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub candidates: usize,
    pub accepted: Vec<Rect>,
    pub rejected: HashMap<Rejection, usize>,
}

impl ScanReport {
    pub fn rejected_count(&self) -> usize {
        self.rejected.values().sum()
    }
}
