use statrs::statistics::{Data, OrderStatistics};
use tracing::debug;

use crate::chain::config::OutlierConfig;

/// Acceptance band `[Q1 - k*IQR, Q3 + k*IQR]` for a set of implied vols.
///
/// Quartiles are order statistics of the sorted values: Q1 is the `n/4`-th and Q3 the
/// `3n/4`-th (0-based), which makes the band independent of input order. Returns `None` for an
/// empty set.
pub fn iqr_bounds(values: &[f64], k: f64) -> Option<(f64, f64)> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let mut data = Data::new(values.to_vec());
    let q1 = data.order_statistic(n / 4 + 1);
    let q3 = data.order_statistic((3 * n) / 4 + 1);
    let iqr = q3 - q1;
    Some((q1 - k * iqr, q3 + k * iqr))
}

/// Drop items whose IV falls outside the IQR band of the group.
///
/// The filter is re-applied until it stops removing anything, so running it on its own output
/// is a no-op. This is stricter than a single pass: removing an extreme value narrows the
/// quartiles, and the tighter band can exclude points the first band kept. Groups smaller than `min_samples` pass through unchanged. Returns the survivors
/// (in input order) and the number removed.
pub fn reject_outliers<T, F>(items: Vec<T>, iv: F, config: &OutlierConfig) -> (Vec<T>, usize)
where
    F: Fn(&T) -> f64,
{
    let total = items.len();
    let mut kept: Vec<T> = items.into_iter().filter(|item| iv(item).is_finite()).collect();

    loop {
        if kept.len() < config.min_samples.max(1) {
            break;
        }
        let values: Vec<f64> = kept.iter().map(&iv).collect();
        let Some((lo, hi)) = iqr_bounds(&values, config.iqr_multiplier) else {
            break;
        };

        let before = kept.len();
        kept.retain(|item| {
            let v = iv(item);
            v >= lo && v <= hi
        });
        if kept.len() == before {
            break;
        }
        debug!(
            removed = before - kept.len(),
            lower = lo,
            upper = hi,
            "IQR filter removed implied-vol outliers"
        );
    }

    let removed = total - kept.len();
    (kept, removed)
}
