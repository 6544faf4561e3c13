//! Threshold decision policy: class probabilities → per-bar decisions.
//!
//! This is the explicit strategy object sitting between a classifier's
//! output and the engine. The engine never sees probabilities; it only
//! consumes the resulting [`Decision`] sequence.

use serde::{Deserialize, Serialize};
use tribar_core::domain::Side;
use tribar_core::engine::Decision;

/// Per-bar class probabilities from an external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbs {
    pub flat: f64,
    pub long: f64,
    pub short: f64,
}

/// Converts one probability row into a decision.
///
/// Long wins when both classes clear their thresholds with equal
/// probability mass; the higher-probability side wins otherwise. Confidence
/// is the winning class probability.
pub fn decide(probs: ClassProbs, long_threshold: f64, short_threshold: f64) -> Decision {
    let long_ok = probs.long >= long_threshold;
    let short_ok = probs.short >= short_threshold;

    match (long_ok, short_ok) {
        (true, true) => {
            if probs.short > probs.long {
                Decision::Enter {
                    side: Side::Short,
                    confidence: probs.short,
                }
            } else {
                Decision::Enter {
                    side: Side::Long,
                    confidence: probs.long,
                }
            }
        }
        (true, false) => Decision::Enter {
            side: Side::Long,
            confidence: probs.long,
        },
        (false, true) => Decision::Enter {
            side: Side::Short,
            confidence: probs.short,
        },
        (false, false) => Decision::Hold,
    }
}

/// Vectorized [`decide`] over an aligned probability sequence.
pub fn decisions_from_probs(
    probs: &[ClassProbs],
    long_threshold: f64,
    short_threshold: f64,
) -> Vec<Decision> {
    probs
        .iter()
        .map(|&p| decide(p, long_threshold, short_threshold))
        .collect()
}
