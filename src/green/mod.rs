// Copyright 2024 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! # Integrated Green's functions
//!
//! Sampling the free-space kernel at cell centres is singular at the origin and
//! inaccurate close to it. Instead, the kernel is integrated exactly over each
//! source cell using a closed-form primitive _F_ with
//! ∂ⁿF/∂x∂y… = G, evaluated at the cell corners with alternating sign
//! (inclusion-exclusion over the lower and upper face of every axis).
//!
//! Corner coordinates are `i·d - d/2` for `i = 0..=n+1`, so the sum at index `i`
//! spans the cell centred at offset `i·d` and no corner ever lies on an axis.
//!
//! More info:
//! - <https://doi.org/10.1103/PhysRevSTAB.9.044204>

mod mirror;

pub use mirror::{fold_index, mirror_fill, mirror_octants, AxisMask};

use crate::{GridGeometry, SlabGeometry, COULOMB_PREFACTOR};
use itertools::iproduct;
use ndarray::{Array2, Array3};

/// Primitive of the 3D Coulomb kernel, 1/4πε₀r.
///
/// ∂³F/∂x∂y∂z = 1/(4πε₀r). Undefined when any coordinate is zero.
///
/// # Examples
/// ~~~
/// use fieldsolver::green::primitive_3d;
/// use fieldsolver::COULOMB_PREFACTOR;
/// // integral of 1/4πε₀r over the unit cube centred at the origin
/// let mut integral = 0.0;
/// for (x, y, z, sign) in [
///     (0.5, 0.5, 0.5, 1.0), (-0.5, 0.5, 0.5, -1.0), (0.5, -0.5, 0.5, -1.0), (0.5, 0.5, -0.5, -1.0),
///     (-0.5, -0.5, 0.5, 1.0), (-0.5, 0.5, -0.5, 1.0), (0.5, -0.5, -0.5, 1.0), (-0.5, -0.5, -0.5, -1.0),
/// ] {
///     integral += sign * primitive_3d(x, y, z);
/// }
/// assert!((integral / COULOMB_PREFACTOR - 2.380077).abs() < 1e-5);
/// ~~~
pub fn primitive_3d(x: f64, y: f64, z: f64) -> f64 {
    let r = (x * x + y * y + z * z).sqrt();
    let inv_r = r.recip();
    COULOMB_PREFACTOR
        * (-0.5
            * (z * z * (x * y * inv_r / z).atan()
                + y * y * (x * z * inv_r / y).atan()
                + x * x * (y * z * inv_r / x).atan())
            + y * z * (x + r).ln()
            + x * z * (y + r).ln()
            + x * y * (z + r).ln())
}

/// Primitive of the 2D line-charge kernel, -ln(r)/2πε₀.
///
/// With G = -ln(x² + y²)/4πε₀,
/// F = -[xy(ln(x² + y²) - 3) + x² atan(y/x) + y² atan(x/y)]/4πε₀
/// satisfies ∂²F/∂x∂y = G. Undefined when any coordinate is zero.
pub fn primitive_2d(x: f64, y: f64) -> f64 {
    let r2 = x * x + y * y;
    -COULOMB_PREFACTOR
        * (x * y * (r2.ln() - 3.0) + x * x * (y / x).atan() + y * y * (x / y).atan())
}

/// Corner coordinates `i·d - d/2` for `i = 0..=n+1`
fn corners(spacing: f64, cells: usize) -> Vec<f64> {
    (0..cells + 2)
        .map(|i| i as f64 * spacing - 0.5 * spacing)
        .collect()
}

/// Integrated Green's function on the doubled (2nx, 2ny, 2nz) grid.
///
/// The octant `[0..=nx, 0..=ny, 0..=nz]` holds the exact potential at offset
/// `(i·dx, j·dy, k·dz)` due to a unit charge density filling the cell at the origin;
/// the rest of the grid is filled by mirror symmetry.
pub fn integrated_green_3d(geometry: &GridGeometry) -> Array3<f64> {
    let [nx, ny, nz] = geometry.cells();
    let spacing = geometry.spacing();
    let (xs, ys, zs) = (
        corners(spacing.x, nx),
        corners(spacing.y, ny),
        corners(spacing.z, nz),
    );
    let primitive = Array3::from_shape_fn((nx + 2, ny + 2, nz + 2), |(i, j, k)| {
        primitive_3d(xs[i], ys[j], zs[k])
    });

    let [mx, my, mz] = geometry.doubled_cells();
    let mut green = Array3::zeros((mx, my, mz));
    for (i, j, k) in iproduct!(0..=nx, 0..=ny, 0..=nz) {
        green[[i, j, k]] = iproduct!(0..2, 0..2, 0..2)
            .map(|(a, b, c)| {
                // odd number of lower corners enter with a negative sign
                let sign = if (a + b + c) % 2 == 1 { 1.0 } else { -1.0 };
                sign * primitive[[i + a, j + b, k + c]]
            })
            .sum();
    }
    mirror_octants(&mut green.view_mut());
    green
}

/// Integrated Green's function on the doubled (2nx, 2ny) grid
///
/// See [`integrated_green_3d`]; this is the two dimensional counterpart using the
/// logarithmic kernel, giving the potential per unit length.
pub fn integrated_green_2d(geometry: &SlabGeometry) -> Array2<f64> {
    let [nx, ny] = geometry.cells();
    let [dx, dy] = geometry.spacing();
    let (xs, ys) = (corners(dx, nx), corners(dy, ny));
    let primitive = Array2::from_shape_fn((nx + 2, ny + 2), |(i, j)| primitive_2d(xs[i], ys[j]));

    let [mx, my] = geometry.doubled_cells();
    let mut green = Array2::zeros((mx, my));
    for (i, j) in iproduct!(0..=nx, 0..=ny) {
        green[[i, j]] = primitive[[i + 1, j + 1]] - primitive[[i, j + 1]] - primitive[[i + 1, j]]
            + primitive[[i, j]];
    }
    mirror_octants(&mut green.view_mut());
    green
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    /// Mixed third derivative of the primitive by central differences
    fn mixed_derivative_3d(x: f64, y: f64, z: f64, h: f64) -> f64 {
        iproduct!([-1.0, 1.0], [-1.0, 1.0], [-1.0, 1.0])
            .map(|(a, b, c)| a * b * c * primitive_3d(x + a * h, y + b * h, z + c * h))
            .sum::<f64>()
            / (8.0 * h * h * h)
    }

    #[test]
    fn test_primitive_3d_derivative() {
        for (x, y, z) in [(1.0, 2.0, 3.0), (-0.7, 1.3, 0.4), (2.5, -1.5, -0.5)] {
            let r = f64::sqrt(x * x + y * y + z * z);
            assert_relative_eq!(
                mixed_derivative_3d(x, y, z, 1e-3),
                COULOMB_PREFACTOR / r,
                max_relative = 1e-4
            );
        }
    }

    #[test]
    fn test_primitive_2d_derivative() {
        let h = 1e-4;
        for (x, y) in [(1.0, 2.0), (-0.7, 1.3), (2.5, -1.5)] {
            let mixed = (primitive_2d(x + h, y + h) - primitive_2d(x - h, y + h)
                - primitive_2d(x + h, y - h)
                + primitive_2d(x - h, y - h))
                / (4.0 * h * h);
            let expected = -COULOMB_PREFACTOR * f64::ln(x * x + y * y);
            assert_relative_eq!(mixed, expected, max_relative = 1e-4);
        }
    }

    /// Far from the source cell the cell integral approaches a point sample times the volume
    #[test]
    fn test_green_3d_far_field() {
        let geometry = GridGeometry::new(1.0, 1.0, 1.0, 8, 8, 8).unwrap();
        let green = integrated_green_3d(&geometry);
        assert_eq!(green.dim(), (16, 16, 16));
        for (i, j, k) in [(5, 0, 0), (0, 6, 0), (4, 4, 3), (7, 2, 1)] {
            let r = ((i * i + j * j + k * k) as f64).sqrt();
            assert_relative_eq!(
                green[[i, j, k]],
                COULOMB_PREFACTOR / r,
                max_relative = 1e-3
            );
        }
    }

    #[test]
    fn test_green_3d_self_term() {
        // potential at the centre of a uniformly charged unit cube, ≈ 2.3800772 / 4πε₀
        let geometry = GridGeometry::new(1.0, 1.0, 1.0, 2, 2, 2).unwrap();
        let green = integrated_green_3d(&geometry);
        assert_relative_eq!(
            green[[0, 0, 0]] / COULOMB_PREFACTOR,
            2.380077,
            max_relative = 1e-5
        );
        // cubic cells are symmetric under axis permutation
        assert_relative_eq!(green[[1, 0, 0]], green[[0, 1, 0]], max_relative = 1e-12);
        assert_relative_eq!(green[[1, 0, 0]], green[[0, 0, 1]], max_relative = 1e-12);
        assert!(green[[0, 0, 0]] > green[[1, 0, 0]]);
    }

    #[test]
    fn test_green_3d_mirrored() {
        let geometry = GridGeometry::new(0.5, 1.0, 2.0, 4, 3, 5).unwrap();
        let green = integrated_green_3d(&geometry);
        for ((i, j, k), &value) in green.indexed_iter() {
            assert_eq!(
                value,
                green[[fold_index(i, 4), fold_index(j, 3), fold_index(k, 5)]]
            );
        }
        assert!(green.iter().all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn test_green_2d_far_field() {
        let geometry = SlabGeometry::new(1.0, 1.0, 8, 8).unwrap();
        let green = integrated_green_2d(&geometry);
        assert_eq!(green.dim(), (16, 16));
        for (i, j) in [(6, 0), (3, 5), (7, 7)] {
            let r = ((i * i + j * j) as f64).sqrt();
            let expected = -r.ln() / (2.0 * PI * physical_constants::VACUUM_ELECTRIC_PERMITTIVITY);
            assert_relative_eq!(green[[i, j]], expected, max_relative = 1e-4);
        }
        assert_eq!(green[[9, 3]], green[[7, 3]]);
    }
}
