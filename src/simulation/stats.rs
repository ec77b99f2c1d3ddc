//! Summary statistics over per-iteration peak voltage drops.

use crate::domain::HistogramBin;

const MIN_SPAN: f64 = 1e-6;

/// Round to two decimals for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean; 0 for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Quantile of an ascending sample with linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let t = pos - lo as f64;
    sorted[lo] * (1.0 - t) + sorted[hi] * t
}

/// Equal-width histogram spanning the observed min to max of an ascending sample.
///
/// `x` is each bin's upper edge, rounded to two decimals. A degenerate sample (all values
/// equal) lands in the first bin.
pub fn histogram(sorted: &[f64], bins: usize) -> Vec<HistogramBin> {
    if bins == 0 {
        return Vec::new();
    }
    let min = sorted.first().copied().unwrap_or(0.0);
    let max = sorted.last().copied().unwrap_or(0.0);
    let span = (max - min).max(MIN_SPAN);

    let mut counts = vec![0u32; bins];
    for v in sorted {
        let idx = (((v - min) / span) * bins as f64).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, y)| HistogramBin {
            x: round2(min + (i + 1) as f64 / bins as f64 * span),
            y,
        })
        .collect()
}

/// Composite robustness score in [0, 1].
///
/// Starts from the success rate and subtracts half the relative overshoot of the p95 peak
/// drop above the ceiling.
pub fn stability_index(failure_risk: f64, p95: f64, ceiling: f64) -> f64 {
    let overshoot = ((p95 - ceiling) / ceiling.max(MIN_SPAN)).max(0.0);
    (1.0 - failure_risk - 0.5 * overshoot).clamp(0.0, 1.0)
}
