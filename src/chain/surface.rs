use crate::chain::config::SurfaceConfig;
use crate::chain::types::SurfacePoint;
use crate::error::InterpolationError;
use crate::models::surface::{
    evaluate_grid, DelaunayInterpolator, GridConfig, SpatialInterpolator, SurfaceGrid,
};

/// Interpolate surviving points onto the configured (moneyness, DTE) grid.
///
/// Uses Delaunay triangulation with linear interpolation inside each triangle. Fails rather than
/// substituting anything when there are too few points or they are all collinear (a single
/// expiration, say); the caller then returns scatter points only.
pub fn build_surface_grid(
    points: &[SurfacePoint],
    config: &SurfaceConfig,
) -> Result<SurfaceGrid, InterpolationError> {
    let interpolator = DelaunayInterpolator {
        rescale: config.grid.rescale,
    };
    build_surface_grid_with(&interpolator, points, config.min_surface_points, &config.grid)
}

/// Same as [`build_surface_grid`] with any [`SpatialInterpolator`].
pub fn build_surface_grid_with<S: SpatialInterpolator>(
    interpolator: &S,
    points: &[SurfacePoint],
    min_points: usize,
    grid: &GridConfig,
) -> Result<SurfaceGrid, InterpolationError> {
    if points.len() < min_points {
        return Err(InterpolationError::TooFewPoints {
            found: points.len(),
            required: min_points,
        });
    }

    let sites: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.moneyness, p.days_to_expiry as f64))
        .collect();
    let values: Vec<f64> = points.iter().map(|p| p.implied_vol).collect();

    let interp = interpolator.fit(&sites, &values)?;

    let mut x_range = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y_range = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &sites {
        x_range = (x_range.0.min(x), x_range.1.max(x));
        y_range = (y_range.0.min(y), y_range.1.max(y));
    }

    Ok(evaluate_grid(&interp, x_range, y_range, grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::types::{AnalyticsResult, IvSource, Quote};
    use crate::models::bs::{Greeks, OptionType};
    use chrono::NaiveDate;

    fn point(moneyness: f64, dte: i64, iv_pct: f64) -> SurfacePoint {
        let expiry = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        SurfacePoint {
            moneyness,
            days_to_expiry: dte,
            implied_vol: iv_pct,
            option_type: OptionType::Call,
            quote: Quote::new(OptionType::Call, expiry, moneyness * 100.0, 1.0, 1.1),
            analytics: AnalyticsResult {
                implied_vol: iv_pct / 100.0,
                iv_source: IvSource::Solved,
                greeks: Greeks {
                    price: 1.05,
                    delta: 0.5,
                    gamma: 0.0,
                    vega: 0.0,
                    theta: 0.0,
                },
            },
        }
    }

    #[test]
    fn test_grid_spans_observed_ranges() {
        let points = vec![
            point(0.9, 7, 25.0),
            point(1.1, 7, 21.0),
            point(0.9, 60, 23.0),
            point(1.1, 60, 19.0),
            point(1.0, 30, 20.0),
        ];
        let config = SurfaceConfig::default();
        let grid = build_surface_grid(&points, &config).unwrap();
        assert_eq!(grid.x.first(), Some(&0.9));
        assert_eq!(grid.x.last(), Some(&1.1));
        assert_eq!(grid.y.first(), Some(&7.0));
        assert_eq!(grid.y.last(), Some(&60.0));
        assert_eq!(grid.z.len(), 50);
        // Rectangular hull: every cell is defined
        assert_eq!(grid.undefined_count(), 0);
        assert!(grid.defined_values().all(|v| (19.0..=25.0).contains(&v)));
    }

    #[test]
    fn test_too_few_points() {
        let points = vec![point(0.9, 7, 25.0), point(1.1, 30, 21.0)];
        let err = build_surface_grid(&points, &SurfaceConfig::default()).unwrap_err();
        assert_eq!(
            err,
            InterpolationError::TooFewPoints {
                found: 2,
                required: 3
            }
        );
    }

    #[test]
    fn test_single_expiry_is_degenerate() {
        let points = vec![point(0.9, 30, 25.0), point(1.0, 30, 20.0), point(1.1, 30, 21.0)];
        let err = build_surface_grid(&points, &SurfaceConfig::default()).unwrap_err();
        assert_eq!(err, InterpolationError::Degenerate);
    }
}
