use std::collections::BTreeMap;

use crate::error::InterpolationError;

use super::delaunay::{orient, triangulate, Triangle};

/// Barycentric weights this far below zero still count as "inside" a triangle, so that
/// queries on shared edges are not lost to rounding.
const BARYCENTRIC_TOL: f64 = 1e-10;

/// A fitted scattered-data interpolant over the plane.
pub trait Interpolant {
    /// Value at `(x, y)`, or `None` when the point lies outside the interpolant's support.
    fn evaluate(&self, x: f64, y: f64) -> Option<f64>;
}

/// Capability of turning 2D scattered sites with scalar values into a queryable interpolant.
pub trait SpatialInterpolator {
    type Output: Interpolant;

    /// Fit an interpolant, or report that the geometry does not allow one.
    fn fit(&self, sites: &[(f64, f64)], values: &[f64])
        -> Result<Self::Output, InterpolationError>;
}

/// Delaunay triangulation with piecewise-linear (barycentric) evaluation.
///
/// With `rescale` the sites are mapped onto the unit square before triangulating, which keeps
/// the triangulation sensible when the two axes have very different units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelaunayInterpolator {
    pub rescale: bool,
}

impl Default for DelaunayInterpolator {
    fn default() -> Self {
        Self { rescale: true }
    }
}

/// Piecewise-linear interpolant over a Delaunay triangulation.
///
/// Queries outside the convex hull return `None`; nothing is extrapolated.
#[derive(Debug, Clone)]
pub struct LinearTriangulation {
    sites: Vec<(f64, f64)>,
    values: Vec<f64>,
    triangles: Vec<Triangle>,
    bboxes: Vec<[f64; 4]>,
    offset: (f64, f64),
    scale: (f64, f64),
    value_range: (f64, f64),
}

impl LinearTriangulation {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Smallest and largest input value; every evaluation lies inside this range.
    pub fn value_range(&self) -> (f64, f64) {
        self.value_range
    }
}

impl Interpolant for LinearTriangulation {
    fn evaluate(&self, x: f64, y: f64) -> Option<f64> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        let p = (
            (x - self.offset.0) / self.scale.0,
            (y - self.offset.1) / self.scale.1,
        );

        for (t, bb) in self.triangles.iter().zip(&self.bboxes) {
            if p.0 < bb[0] || p.0 > bb[2] || p.1 < bb[1] || p.1 > bb[3] {
                continue;
            }
            let (a, b, c) = (self.sites[t.a], self.sites[t.b], self.sites[t.c]);
            let area = orient(a, b, c);
            let wa = orient(b, c, p) / area;
            let wb = orient(c, a, p) / area;
            let wc = orient(a, b, p) / area;
            if wa < -BARYCENTRIC_TOL || wb < -BARYCENTRIC_TOL || wc < -BARYCENTRIC_TOL {
                continue;
            }

            // Clamp and renormalise so the result is a convex combination of the vertices
            let (wa, wb, wc) = (wa.max(0.0), wb.max(0.0), wc.max(0.0));
            let sum = wa + wb + wc;
            let v = (wa * self.values[t.a] + wb * self.values[t.b] + wc * self.values[t.c]) / sum;
            return Some(v.clamp(self.value_range.0, self.value_range.1));
        }
        None
    }
}

/// Merge coincident sites by averaging their values, keyed on rounded coordinates.
fn merge_coincident(sites: &[(f64, f64)], values: &[f64]) -> (Vec<(f64, f64)>, Vec<f64>) {
    let mut groups: BTreeMap<(i64, i64), (f64, f64, f64, usize)> = BTreeMap::new();
    for (&(x, y), &v) in sites.iter().zip(values) {
        let key = ((x * 1e8).round() as i64, (y * 1e8).round() as i64);
        let entry = groups.entry(key).or_insert((x, y, 0.0, 0));
        entry.2 += v;
        entry.3 += 1;
    }
    groups
        .into_values()
        .map(|(x, y, sum, count)| ((x, y), sum / count as f64))
        .unzip()
}

impl SpatialInterpolator for DelaunayInterpolator {
    type Output = LinearTriangulation;

    fn fit(
        &self,
        sites: &[(f64, f64)],
        values: &[f64],
    ) -> Result<LinearTriangulation, InterpolationError> {
        let (raw_sites, values): (Vec<(f64, f64)>, Vec<f64>) = sites
            .iter()
            .zip(values)
            .filter(|(s, v)| s.0.is_finite() && s.1.is_finite() && v.is_finite())
            .map(|(s, v)| (*s, *v))
            .unzip();
        let (raw_sites, values) = merge_coincident(&raw_sites, &values);

        if raw_sites.len() < 3 {
            return Err(InterpolationError::TooFewPoints {
                found: raw_sites.len(),
                required: 3,
            });
        }

        let (mut offset, mut scale) = ((0.0, 0.0), (1.0, 1.0));
        if self.rescale {
            let min_x = raw_sites.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
            let max_x = raw_sites.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
            let min_y = raw_sites.iter().map(|s| s.1).fold(f64::INFINITY, f64::min);
            let max_y = raw_sites.iter().map(|s| s.1).fold(f64::NEG_INFINITY, f64::max);
            // A zero span on either axis means every site is collinear
            if max_x - min_x <= 0.0 || max_y - min_y <= 0.0 {
                return Err(InterpolationError::Degenerate);
            }
            offset = (min_x, min_y);
            scale = (max_x - min_x, max_y - min_y);
        }

        let sites: Vec<(f64, f64)> = raw_sites
            .iter()
            .map(|s| ((s.0 - offset.0) / scale.0, (s.1 - offset.1) / scale.1))
            .collect();

        let triangles = triangulate(&sites)?;
        let bboxes = triangles
            .iter()
            .map(|t| {
                let (a, b, c) = (sites[t.a], sites[t.b], sites[t.c]);
                let pad = BARYCENTRIC_TOL;
                [
                    a.0.min(b.0).min(c.0) - pad,
                    a.1.min(b.1).min(c.1) - pad,
                    a.0.max(b.0).max(c.0) + pad,
                    a.1.max(b.1).max(c.1) + pad,
                ]
            })
            .collect();

        let value_range = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Ok(LinearTriangulation {
            sites,
            values,
            triangles,
            bboxes,
            offset,
            scale,
            value_range,
        })
    }
}
