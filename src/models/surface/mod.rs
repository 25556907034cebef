//! Scattered-to-grid interpolation.
//!
//! Sites are triangulated by a hull sweep with Delaunay edge flips, values are interpolated
//! linearly inside each triangle, and the interpolant is sampled on a regular grid. Anything
//! outside the convex hull of the sites stays undefined.

pub mod delaunay;
pub mod grid;
pub mod interp;

pub use grid::{evaluate_grid, linspace, GridConfig, SurfaceGrid};
pub use interp::{DelaunayInterpolator, Interpolant, LinearTriangulation, SpatialInterpolator};
