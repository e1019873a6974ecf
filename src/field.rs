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

//! Electric field from a gridded potential.

use crate::{GridGeometry, SolverError, SolverResult, Vector3};
use ndarray::{Array3, ArrayView1, Axis};

/// Derivative along a single lane: central differences inside, one-sided at the ends
fn derivative(lane: ArrayView1<f64>, spacing: f64, out: &mut [f64]) {
    let n = lane.len();
    if n < 2 {
        out.iter_mut().for_each(|v| *v = 0.0);
        return;
    }
    out[0] = (lane[1] - lane[0]) / spacing;
    out[n - 1] = (lane[n - 1] - lane[n - 2]) / spacing;
    for i in 1..n - 1 {
        out[i] = 0.5 * (lane[i + 1] - lane[i - 1]) / spacing;
    }
}

/// Electric field, E = -∇φ, at every node of `phi`.
///
/// # Examples
/// ~~~
/// use fieldsolver::{field::electric_field, GridGeometry};
/// use ndarray::Array3;
/// let geometry = GridGeometry::new(0.5, 1.0, 1.0, 4, 3, 2).unwrap();
/// // linear potential φ = -2x gives a uniform field along x
/// let phi = Array3::from_shape_fn((4, 3, 2), |(i, _, _)| -2.0 * 0.5 * i as f64);
/// let field = electric_field(&phi, &geometry).unwrap();
/// assert!(field.iter().all(|e| (e.x - 2.0).abs() < 1e-12 && e.y == 0.0 && e.z == 0.0));
/// ~~~
pub fn electric_field(phi: &Array3<f64>, geometry: &GridGeometry) -> SolverResult<Array3<Vector3>> {
    let cells = geometry.cells();
    if phi.shape() != &cells[..] {
        return Err(SolverError::ShapeMismatch {
            expected: cells.to_vec(),
            found: phi.shape().to_vec(),
        });
    }
    let spacing = geometry.spacing();
    let mut field = Array3::from_elem(phi.raw_dim(), Vector3::zeros());
    let mut buffer = Vec::new();
    for axis in 0..3 {
        buffer.resize(cells[axis], 0.0);
        for (lane, mut field_lane) in phi
            .lanes(Axis(axis))
            .into_iter()
            .zip(field.lanes_mut(Axis(axis)))
        {
            derivative(lane, spacing[axis], &mut buffer);
            field_lane
                .iter_mut()
                .zip(&buffer)
                .for_each(|(e, gradient)| e[axis] = -gradient);
        }
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OpenBoundarySolver3D, PoissonSolver, COULOMB_PREFACTOR};
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_potential() {
        // φ = x² + 3y - z², exact for central differences in the interior
        let geometry = GridGeometry::new(0.1, 0.2, 0.3, 5, 4, 6).unwrap();
        let phi = Array3::from_shape_fn((5, 4, 6), |(i, j, k)| {
            let (x, y, z) = (0.1 * i as f64, 0.2 * j as f64, 0.3 * k as f64);
            x * x + 3.0 * y - z * z
        });
        let field = electric_field(&phi, &geometry).unwrap();
        let e = field[[2, 1, 3]];
        assert_relative_eq!(e.x, -0.4, epsilon = 1e-12);
        assert_relative_eq!(e.y, -3.0, epsilon = 1e-12);
        assert_relative_eq!(e.z, 1.8, epsilon = 1e-12);
        // one-sided difference at the lower x boundary
        assert_relative_eq!(field[[0, 1, 3]].x, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_single_cell_axis() {
        let geometry = GridGeometry::new(1.0, 1.0, 1.0, 3, 3, 1).unwrap();
        let phi = Array3::from_shape_fn((3, 3, 1), |(i, j, _)| (i + j) as f64);
        let field = electric_field(&phi, &geometry).unwrap();
        assert!(field.iter().all(|e| e.z == 0.0));
        assert!(electric_field(&Array3::zeros((3, 3, 2)), &geometry).is_err());
    }

    /// Field of a point charge points radially outwards and falls off as 1/r²
    #[test]
    fn test_point_charge_field() {
        let n = 17;
        let geometry = GridGeometry::new(1.0, 1.0, 1.0, n, n, n).unwrap();
        let mut solver = OpenBoundarySolver3D::new(geometry).unwrap();
        let mut rho = Array3::zeros((n, n, n));
        rho[[8, 8, 8]] = 1.0 / COULOMB_PREFACTOR;
        let phi = solver.solve(rho.view()).unwrap();
        let field = electric_field(&phi, &geometry).unwrap();
        let e = field[[14, 8, 8]];
        // central difference of 1/r over ±1 at r = 6
        let expected = 0.5 * (1.0 / 5.0 - 1.0 / 7.0);
        assert_relative_eq!(e.x, expected, max_relative = 1e-3);
        assert_relative_eq!(e.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(e.z, 0.0, epsilon = 1e-9);
        assert!(field[[2, 8, 8]].x < 0.0);
    }
}
