use chrono::NaiveDate;

use crate::chain::config::SamplingConfig;
use crate::chain::types::days_to_expiry;

/// Choose which expirations to analyse.
///
/// Already-expired dates and dates beyond the horizon are dropped. The nearest
/// `near_term_count` of the rest are always kept (0-3 DTE weeklies live there); the remainder
/// are sampled at evenly spaced positions, first and last included, up to `far_sample_cap`.
/// The input need not be sorted; the output is ascending and deterministic.
pub fn sample_expirations(
    expirations: &[NaiveDate],
    today: NaiveDate,
    config: &SamplingConfig,
) -> Vec<NaiveDate> {
    let mut valid: Vec<NaiveDate> = expirations
        .iter()
        .copied()
        .filter(|&d| {
            let dte = days_to_expiry(d, today);
            dte >= 0 && dte <= config.horizon_days
        })
        .collect();
    valid.sort_unstable();
    valid.dedup();

    let near = config.near_term_count.min(valid.len());
    let rest = &valid[near..];
    let mut selected = valid[..near].to_vec();
    selected.extend(
        spread_indices(rest.len(), config.far_sample_cap)
            .into_iter()
            .map(|i| rest[i]),
    );
    selected
}

/// `count` indices spread evenly over `0..len`, including both ends when `count >= 2`.
fn spread_indices(len: usize, count: usize) -> Vec<usize> {
    if len <= count {
        return (0..len).collect();
    }
    match count {
        0 => Vec::new(),
        1 => vec![0],
        _ => {
            let span = (len - 1) as f64 / (count - 1) as f64;
            (0..count).map(|i| (i as f64 * span).round() as usize).collect()
        }
    }
}
