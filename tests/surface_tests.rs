mod test_utils;

use iv_surface::models::surface::{delaunay::triangulate, evaluate_grid, GridConfig};
use iv_surface::{DelaunayInterpolator, Interpolant, InterpolationError, SpatialInterpolator};
use rand::Rng;
use test_utils::seeded_rng;

fn random_sites(rng: &mut impl Rng, n: usize) -> Vec<(f64, f64)> {
    // Moneyness and DTE scales, as the surface sees them
    (0..n)
        .map(|_| (rng.gen_range(0.85..1.15), rng.gen_range(0.0..100.0)))
        .collect()
}

/// Convex hull by monotone chain, counter-clockwise, collinear points dropped.
fn convex_hull(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut pts = points.to_vec();
    pts.sort_by(|p, q| p.0.total_cmp(&q.0).then(p.1.total_cmp(&q.1)));
    let cross = |o: (f64, f64), a: (f64, f64), b: (f64, f64)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };

    let mut hull: Vec<(f64, f64)> = Vec::new();
    for pass in [pts.clone(), pts.into_iter().rev().collect()] {
        let floor = hull.len();
        for p in pass {
            while hull.len() >= floor + 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

/// Distance from `p` to the nearest hull edge, negative outside.
fn hull_depth(hull: &[(f64, f64)], p: (f64, f64)) -> f64 {
    (0..hull.len())
        .map(|i| {
            let (a, b) = (hull[i], hull[(i + 1) % hull.len()]);
            let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
            ((b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)) / len
        })
        .fold(f64::INFINITY, f64::min)
}

/// Sites mapped onto the unit square so depths along both axes are comparable.
fn normalized(p: (f64, f64)) -> (f64, f64) {
    ((p.0 - 0.85) / 0.3, p.1 / 100.0)
}

/// Interpolated values never leave [min, max] of the inputs.
/// Random sites and values, evaluated on a dense grid covering and exceeding the hull.
#[test]
fn test_interpolation_stays_within_input_range() {
    let mut rng = seeded_rng();

    for _ in 0..20 {
        let n = rng.gen_range(3..60);
        let sites = random_sites(&mut rng, n);
        let values: Vec<f64> = (0..n).map(|_| rng.gen_range(10.0..80.0)).collect();
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let interp = DelaunayInterpolator::default().fit(&sites, &values).unwrap();
        let grid = evaluate_grid(&interp, (0.8, 1.2), (-5.0, 105.0), &GridConfig::default());
        for v in grid.defined_values() {
            assert!(v >= lo && v <= hi, "{} outside [{}, {}]", v, lo, hi);
        }
    }
}

/// Every input site evaluates to its own value.
#[test]
fn test_interpolation_reproduces_sites() {
    let mut rng = seeded_rng();
    let sites = random_sites(&mut rng, 40);
    let values: Vec<f64> = (0..40).map(|_| rng.gen_range(10.0..80.0)).collect();

    let interp = DelaunayInterpolator::default().fit(&sites, &values).unwrap();
    for (&(x, y), &v) in sites.iter().zip(&values) {
        let got = interp.evaluate(x, y).expect("site lies on the hull or inside it");
        assert!((got - v).abs() < 1e-6, "site ({}, {}): expected {}, got {}", x, y, v, got);
    }
}

/// A linear function of (moneyness, DTE) is reproduced exactly inside the hull.
#[test]
fn test_linear_function_is_exact() {
    let mut rng = seeded_rng();
    let f = |x: f64, y: f64| 20.0 - 15.0 * (x - 1.0) + 0.05 * y;
    let sites = random_sites(&mut rng, 30);
    let values: Vec<f64> = sites.iter().map(|&(x, y)| f(x, y)).collect();
    let hull = convex_hull(&sites.iter().map(|&p| normalized(p)).collect::<Vec<_>>());

    for rescale in [true, false] {
        let interp = DelaunayInterpolator { rescale }.fit(&sites, &values).unwrap();
        for _ in 0..200 {
            let (x, y) = (rng.gen_range(0.85..1.15), rng.gen_range(0.0..100.0));
            match interp.evaluate(x, y) {
                Some(v) => assert!((v - f(x, y)).abs() < 1e-6),
                None => assert!(hull_depth(&hull, normalized((x, y))) < 1e-9),
            }
        }
    }
}

/// Every grid cell strictly inside the convex hull of the sites has a value.
/// Sparse site sets put many sites on the hull, where the triangulation must still reach the boundary.
#[test]
fn test_grid_covers_convex_hull() {
    let mut rng = seeded_rng();

    for _ in 0..40 {
        let n = rng.gen_range(3..40);
        let sites = random_sites(&mut rng, n);
        let values: Vec<f64> = (0..n).map(|_| rng.gen_range(10.0..80.0)).collect();
        let hull = convex_hull(&sites.iter().map(|&p| normalized(p)).collect::<Vec<_>>());

        for rescale in [true, false] {
            let interp = DelaunayInterpolator { rescale }.fit(&sites, &values).unwrap();
            let grid = evaluate_grid(&interp, (0.85, 1.15), (0.0, 100.0), &GridConfig::default());
            for (j, row) in grid.z.iter().enumerate() {
                for (i, cell) in row.iter().enumerate() {
                    let (x, y) = (grid.x[i], grid.y[j]);
                    if hull_depth(&hull, normalized((x, y))) > 1e-9 {
                        assert!(
                            cell.is_some(),
                            "({}, {}) inside the hull of {} sites is undefined",
                            x,
                            y,
                            n
                        );
                    }
                }
            }
        }
    }
}

/// Sites on a line plus a single apex still cover the whole triangle they span.
#[test]
fn test_collinear_run_with_apex_covers_hull() {
    let sites = [(0.9, 10.0), (0.95, 10.0), (1.0, 10.0), (1.05, 10.0), (1.1, 10.0), (1.0, 90.0)];
    let values = [20.0, 21.0, 22.0, 23.0, 24.0, 30.0];
    let interp = DelaunayInterpolator::default().fit(&sites, &values).unwrap();

    assert!(interp.evaluate(0.91, 11.0).is_some());
    assert!(interp.evaluate(1.09, 11.0).is_some());
    assert!(interp.evaluate(1.0, 89.0).is_some());
    assert_eq!(interp.evaluate(0.91, 80.0), None);
}

/// Queries outside the convex hull are undefined rather than extrapolated.
#[test]
fn test_outside_hull_is_undefined() {
    let sites = [(0.9, 10.0), (1.1, 10.0), (1.0, 60.0)];
    let values = [20.0, 24.0, 30.0];
    let interp = DelaunayInterpolator::default().fit(&sites, &values).unwrap();

    assert!(interp.evaluate(1.0, 30.0).is_some());
    assert_eq!(interp.evaluate(0.9, 60.0), None);
    assert_eq!(interp.evaluate(1.0, 5.0), None);
    assert_eq!(interp.evaluate(1.2, 30.0), None);
    assert_eq!(interp.evaluate(f64::NAN, 30.0), None);
}

/// Collinear or too-small inputs are reported, not papered over.
#[test]
fn test_degenerate_inputs() {
    let interp = DelaunayInterpolator::default();
    assert_eq!(
        interp.fit(&[(0.9, 30.0), (1.0, 30.0)], &[20.0, 21.0]).unwrap_err(),
        InterpolationError::TooFewPoints {
            found: 2,
            required: 3
        }
    );
    assert_eq!(
        interp
            .fit(&[(0.9, 30.0), (1.0, 30.0), (1.1, 30.0)], &[20.0, 21.0, 22.0])
            .unwrap_err(),
        InterpolationError::Degenerate
    );
    // Three sites collapsing onto two after merging
    assert!(matches!(
        interp.fit(&[(0.9, 30.0), (0.9, 30.0), (1.0, 45.0)], &[20.0, 22.0, 21.0]),
        Err(InterpolationError::TooFewPoints { found: 2, .. })
    ));
}

/// Random point sets triangulate into n-ish triangles with every site used.
#[test]
fn test_triangulation_uses_every_site() {
    let mut rng = seeded_rng();
    let pts: Vec<(f64, f64)> = (0..50)
        .map(|_| (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
        .collect();
    let tris = triangulate(&pts).unwrap();

    let mut used = vec![false; pts.len()];
    for t in &tris {
        used[t.a] = true;
        used[t.b] = true;
        used[t.c] = true;
    }
    assert!(used.iter().all(|u| *u));
    // Euler: 2n - 2 - h triangles for n sites with h on the hull
    assert!(tris.len() <= 2 * pts.len() - 5);
    assert!(tris.len() >= pts.len() - 2);
}
