use serde::{Deserialize, Serialize};

use super::interp::Interpolant;

/// Resolution of the output grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_steps")]
    pub moneyness_steps: usize,
    #[serde(default = "default_steps")]
    pub dte_steps: usize,
    /// Map sites onto the unit square before triangulating
    #[serde(default = "default_rescale")]
    pub rescale: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            moneyness_steps: default_steps(),
            dte_steps: default_steps(),
            rescale: default_rescale(),
        }
    }
}

fn default_steps() -> usize {
    50
}

fn default_rescale() -> bool {
    true
}

/// Regular grid of interpolated values.
///
/// `z[j][i]` is the value at `(x[i], y[j])`: one row per DTE sample, one column per moneyness
/// sample. Cells outside the convex hull of the inputs are `None` (serialised as `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<Option<f64>>>,
}

impl SurfaceGrid {
    /// Iterator over every defined cell value.
    pub fn defined_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.z.iter().flatten().filter_map(|v| *v)
    }

    pub fn undefined_count(&self) -> usize {
        self.z.iter().flatten().filter(|v| v.is_none()).count()
    }
}

/// `n` evenly spaced samples over `[lo, hi]`, endpoints included.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Evaluate `interp` on the regular grid spanning `x_range` × `y_range`.
pub fn evaluate_grid<I: Interpolant>(
    interp: &I,
    x_range: (f64, f64),
    y_range: (f64, f64),
    config: &GridConfig,
) -> SurfaceGrid {
    let x = linspace(x_range.0, x_range.1, config.moneyness_steps);
    let y = linspace(y_range.0, y_range.1, config.dte_steps);
    let z = y
        .iter()
        .map(|&yj| x.iter().map(|&xi| interp.evaluate(xi, yj)).collect())
        .collect();
    SurfaceGrid { x, y, z }
}
