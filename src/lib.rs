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

//! # Fieldsolver
//!
//! Open-boundary Poisson solvers for charge densities sampled on rectangular grids,
//! as used for space-charge and electron-lens field maps in beam dynamics.
//!
//! The potential of an _isolated_ charge distribution is obtained with FFTs by
//! convolving the density with an integrated Green's function embedded in a grid
//! of twice the size along each axis.
//!
//! ## Examples
//! ~~~
//! use fieldsolver::{GridGeometry, OpenBoundarySolver3D, PoissonSolver};
//! use ndarray::Array3;
//! let geometry = GridGeometry::new(1e-3, 1e-3, 1e-3, 8, 8, 8).unwrap();
//! let mut solver = OpenBoundarySolver3D::new(geometry).unwrap();
//! let rho = Array3::zeros((8, 8, 8));
//! let phi = solver.solve(rho.view()).unwrap();
//! assert_eq!(phi.dim(), (8, 8, 8));
//! assert!(phi.iter().all(|&v| v == 0.0));
//! ~~~

#[cfg(test)]
extern crate approx;

/// A point in 3D space
pub type Vector3 = nalgebra::Vector3<f64>;

use physical_constants::VACUUM_ELECTRIC_PERMITTIVITY;
use std::f64::consts::PI;

mod error;
pub mod fft;
pub mod field;
mod geometry;
pub mod green;
pub mod solver;

pub use error::{SolverError, SolverResult};
pub use fft::FftContext;
pub use geometry::{GridGeometry, SlabGeometry};
pub use solver::{
    OpenBoundarySolver2D, OpenBoundarySolver3D, PoissonSolver, Solver2p5D, SpectralKernel,
    Workspace,
};

/// Coulomb prefactor, 1/4πε₀ (V m / C).
///
/// Examples:
/// ```
/// use fieldsolver::COULOMB_PREFACTOR;
/// let charge = 1e-9; // C
/// let r = 0.1;       // m
/// let potential = COULOMB_PREFACTOR * charge / r;
/// assert!((potential - 89.8755).abs() < 1e-3); // V
/// ```
pub const COULOMB_PREFACTOR: f64 = 1.0 / (4.0 * PI * VACUUM_ELECTRIC_PERMITTIVITY);

/// Descriptive information about a solver or kernel
pub trait Info {
    /// Short name
    fn short_name(&self) -> Option<&'static str> {
        None
    }
    /// Long, descriptive name
    fn long_name(&self) -> Option<&'static str> {
        None
    }
    /// Literature reference
    fn citation(&self) -> Option<&'static str> {
        None
    }
    /// URL to further information
    fn url(&self) -> Option<String> {
        self.citation().and_then(|c| {
            c.strip_prefix("doi:")
                .map(|doi| format!("https://doi.org/{}", doi))
        })
    }
}
