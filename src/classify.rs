//! Earnings-surprise classification.

use crate::types::SurpriseGroup;

/// Surprise magnitude (in percent) that must be exceeded to leave the Meet group.
pub const SURPRISE_THRESHOLD_PCT: f64 = 5.0;

/// Percentage deviation of actual EPS from the estimate.
///
/// Defined as exactly `0.0` when the estimate is zero.
pub fn surprise_pct(eps_estimate: f64, actual_eps: f64) -> f64 {
    if eps_estimate != 0.0 {
        (actual_eps - eps_estimate) / eps_estimate.abs() * 100.0
    } else {
        0.0
    }
}

/// Bucket a surprise percentage. The ±5% boundaries belong to Meet.
pub fn classify_surprise(surprise_pct: f64) -> SurpriseGroup {
    if surprise_pct > SURPRISE_THRESHOLD_PCT {
        SurpriseGroup::Beat
    } else if surprise_pct < -SURPRISE_THRESHOLD_PCT {
        SurpriseGroup::Miss
    } else {
        SurpriseGroup::Meet
    }
}

/// Surprise percentage and group for an estimate/actual pair.
pub fn classify(eps_estimate: f64, actual_eps: f64) -> (f64, SurpriseGroup) {
    let pct = surprise_pct(eps_estimate, actual_eps);
    (pct, classify_surprise(pct))
}
