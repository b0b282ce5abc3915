use super::{Rejection, Verdict};
use crate::region::mean;

/// Accepts a border whose mean luminance is at most `max_mean`.
#[derive(Debug, Clone, Copy)]
pub struct BorderClassifier {
    pub max_mean: f64,
}

impl Default for BorderClassifier {
    fn default() -> Self {
        Self { max_mean: 100.0 }
    }
}

impl BorderClassifier {
    pub fn classify(&self, samples: &[u8]) -> Verdict {
        match mean(samples) {
            None => Verdict::Rejected(Rejection::BorderEmpty),
            Some(avg) => Verdict::check(avg <= self.max_mean, Rejection::BorderTooLight),
        }
    }

    pub fn is_dark(&self, samples: &[u8]) -> bool {
        self.classify(samples).is_accepted()
    }
}
