//! Agreement-based confidence scoring over independent AI estimates.
//!
//! Single-model follower estimates are frequently stale or fabricated.
//! Requiring two independent estimates to agree within 2% rejects wild
//! guesses while tolerating minor rounding differences between models.

use serde::{Deserialize, Serialize};

/// Maximum relative difference for two candidates to count as agreeing.
const AGREEMENT_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusResult {
    pub value: Option<u64>,
    pub confidence: Confidence,
}

/// Reconcile candidate follower counts from independent model queries.
///
/// With two or more candidates, the first pair (scanning the sorted list)
/// whose relative difference is within tolerance wins: high confidence,
/// value = rounded midpoint. With no agreeing pair the middle element of
/// the sorted list is returned as a low-confidence estimate. Fewer than two
/// candidates can never be high confidence.
pub fn resolve(candidates: &[u64]) -> ConsensusResult {
    match candidates {
        [] => ConsensusResult {
            value: None,
            confidence: Confidence::Low,
        },
        [single] => ConsensusResult {
            value: Some(*single),
            confidence: Confidence::Low,
        },
        _ => {
            let mut sorted = candidates.to_vec();
            sorted.sort_unstable();

            for i in 0..sorted.len() {
                for j in (i + 1)..sorted.len() {
                    let (a, b) = (sorted[i], sorted[j]);
                    let rel = (b - a) as f64 / b.max(1) as f64;
                    if rel <= AGREEMENT_TOLERANCE {
                        let midpoint = ((a as f64 + b as f64) / 2.0).round() as u64;
                        return ConsensusResult {
                            value: Some(midpoint),
                            confidence: Confidence::High,
                        };
                    }
                }
            }

            ConsensusResult {
                value: Some(sorted[sorted.len() / 2]),
                confidence: Confidence::Low,
            }
        }
    }
}
