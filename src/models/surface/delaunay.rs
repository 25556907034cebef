use std::collections::HashMap;

use crate::error::InterpolationError;

/// Relative tolerance used to decide whether a point set spans a plane.
const COLLINEAR_TOL: f64 = 1e-10;

/// Relative tolerance on the incircle determinant before an edge is flipped.
const INCIRCLE_TOL: f64 = 1e-14;

/// Counter-clockwise triangle referencing vertex indices into the input slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

/// Twice the signed area of (a, b, c); positive when counter-clockwise.
pub fn orient(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Positive when `d` lies inside the circumcircle of the counter-clockwise triangle (a, b, c).
fn incircle(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> f64 {
    let (adx, ady) = (a.0 - d.0, a.1 - d.1);
    let (bdx, bdy) = (b.0 - d.0, b.1 - d.1);
    let (cdx, cdy) = (c.0 - d.0, c.1 - d.1);
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;
    adx * (bdy * cd - bd * cdy) - ady * (bdx * cd - bd * cdx) + ad * (bdx * cdy - bdy * cdx)
}

/// Returns `Err(Degenerate)` unless at least three of the points are affinely independent.
pub fn check_spans_plane(points: &[(f64, f64)]) -> Result<(), InterpolationError> {
    let Some(&p0) = points.first() else {
        return Err(InterpolationError::Degenerate);
    };

    let dist2 = |p: (f64, f64)| (p.0 - p0.0).powi(2) + (p.1 - p0.1).powi(2);
    let p1 = points
        .iter()
        .copied()
        .max_by(|a, b| dist2(*a).total_cmp(&dist2(*b)))
        .unwrap_or(p0);
    let extent2 = dist2(p1);
    if extent2 <= 0.0 {
        return Err(InterpolationError::Degenerate);
    }

    let spans = points
        .iter()
        .any(|&p| orient(p0, p1, p).abs() > COLLINEAR_TOL * extent2);
    if spans {
        Ok(())
    } else {
        Err(InterpolationError::Degenerate)
    }
}

/// Delaunay triangulation covering the whole convex hull of `points`.
///
/// Points are swept in (x, y) order: each one lies outside the hull built so far and is joined to
/// every hull edge it can see, so the union of triangles is always the convex hull. Lawson edge
/// flips then make the triangulation Delaunay. Points must be distinct. Returned triangles are
/// counter-clockwise and index into `points`.
pub fn triangulate(points: &[(f64, f64)]) -> Result<Vec<Triangle>, InterpolationError> {
    if points.len() < 3 {
        return Err(InterpolationError::TooFewPoints {
            found: points.len(),
            required: 3,
        });
    }
    check_spans_plane(points)?;

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        let (p, q) = (points[i], points[j]);
        p.0.total_cmp(&q.0).then(p.1.total_cmp(&q.1))
    });

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let extent2 = (max_x - min_x).powi(2) + (max_y - min_y).powi(2);

    // Seed: the leading run of collinear points fanned to the first point off their line
    let (p0, p1) = (points[order[0]], points[order[1]]);
    let base = ((p1.0 - p0.0).powi(2) + (p1.1 - p0.1).powi(2)).sqrt() * extent2.sqrt();
    let k = (2..order.len())
        .find(|&k| orient(p0, p1, points[order[k]]).abs() > COLLINEAR_TOL * base)
        .ok_or(InterpolationError::Degenerate)?;
    let apex = order[k];
    let run = &order[..k];

    let mut triangles = Vec::with_capacity(2 * points.len());
    for w in run.windows(2) {
        let area = orient(points[w[0]], points[w[1]], points[apex]);
        if area > 0.0 {
            triangles.push(Triangle { a: w[0], b: w[1], c: apex });
        } else if area < 0.0 {
            triangles.push(Triangle { a: w[1], b: w[0], c: apex });
        }
    }

    // Hull vertices in counter-clockwise order
    let mut hull: Vec<usize> = if orient(p0, points[run[k - 1]], points[apex]) > 0.0 {
        run.iter().copied().chain(std::iter::once(apex)).collect()
    } else {
        run.iter().rev().copied().chain(std::iter::once(apex)).collect()
    };

    for &q in &order[k + 1..] {
        let m = hull.len();
        let visible: Vec<bool> = (0..m)
            .map(|i| orient(points[hull[i]], points[hull[(i + 1) % m]], points[q]) < 0.0)
            .collect();
        let Some(start) = (0..m).find(|&i| visible[i] && !visible[(i + m - 1) % m]) else {
            continue;
        };
        let count = (0..m).take_while(|&j| visible[(start + j) % m]).count();

        for j in 0..count {
            let (u, v) = (hull[(start + j) % m], hull[(start + j + 1) % m]);
            triangles.push(Triangle { a: v, b: u, c: q });
        }
        hull.rotate_left(start);
        hull.drain(1..count);
        hull.insert(1, q);
    }

    if triangles.is_empty() {
        return Err(InterpolationError::Degenerate);
    }
    legalize(points, &mut triangles, INCIRCLE_TOL * extent2 * extent2);
    Ok(triangles)
}

fn directed_edges(t: &Triangle) -> [(usize, usize); 3] {
    [(t.a, t.b), (t.b, t.c), (t.c, t.a)]
}

fn opposite(t: &Triangle, a: usize, b: usize) -> Option<usize> {
    [t.a, t.b, t.c].into_iter().find(|&v| v != a && v != b)
}

/// Flip every edge whose opposite vertex lies inside the neighbouring circumcircle.
fn legalize(points: &[(f64, f64)], triangles: &mut [Triangle], tol: f64) {
    let mut owner: HashMap<(usize, usize), usize> = HashMap::new();
    for (i, t) in triangles.iter().enumerate() {
        for e in directed_edges(t) {
            owner.insert(e, i);
        }
    }

    let mut pending: Vec<(usize, usize)> = owner.keys().copied().collect();
    let mut budget = 64 * triangles.len() * triangles.len();
    while let Some((a, b)) = pending.pop() {
        let (Some(&ti), Some(&tj)) = (owner.get(&(a, b)), owner.get(&(b, a))) else {
            continue;
        };
        let (Some(c), Some(d)) = (opposite(&triangles[ti], a, b), opposite(&triangles[tj], b, a))
        else {
            continue;
        };
        let (pa, pb, pc, pd) = (points[a], points[b], points[c], points[d]);
        if incircle(pa, pb, pc, pd) <= tol || orient(pc, pa, pd) <= 0.0 || orient(pc, pd, pb) <= 0.0
        {
            continue;
        }

        for e in directed_edges(&triangles[ti])
            .into_iter()
            .chain(directed_edges(&triangles[tj]))
        {
            owner.remove(&e);
        }
        triangles[ti] = Triangle { a: c, b: a, c: d };
        triangles[tj] = Triangle { a: c, b: d, c: b };
        for (i, t) in [(ti, triangles[ti]), (tj, triangles[tj])] {
            for e in directed_edges(&t) {
                owner.insert(e, i);
            }
        }
        pending.extend([(c, a), (a, d), (d, b), (b, c)]);

        budget = budget.saturating_sub(1);
        if budget == 0 {
            break;
        }
    }
}
