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

use super::{PoissonSolver, SpectralKernel, Workspace};
use crate::green::integrated_green_3d;
use crate::{FftContext, GridGeometry, Info, SolverResult};
use ndarray::{Array3, ArrayView3, Ix3};
use std::sync::Arc;

/// Open-boundary FFT Poisson solver on a three dimensional grid.
///
/// The potential (V) is returned for a charge density (C/m³) sampled at the cell
/// centres of the grid. Charge must lie within the declared grid.
///
/// # Examples
/// ~~~
/// use fieldsolver::{GridGeometry, OpenBoundarySolver3D, PoissonSolver, COULOMB_PREFACTOR};
/// use ndarray::Array3;
/// let geometry = GridGeometry::new(1.0, 1.0, 1.0, 9, 9, 9).unwrap();
/// let mut solver = OpenBoundarySolver3D::new(geometry).unwrap();
/// let mut rho = Array3::zeros((9, 9, 9));
/// rho[[0, 4, 4]] = 1.0 / COULOMB_PREFACTOR; // potential becomes 1/r
/// let phi = solver.solve(rho.view()).unwrap();
/// assert!((phi[[8, 4, 4]] - 1.0 / 8.0).abs() < 1e-5);
/// ~~~
#[derive(Debug)]
pub struct OpenBoundarySolver3D {
    geometry: GridGeometry,
    kernel: Arc<SpectralKernel<Ix3>>,
    workspace: Workspace<Ix3>,
}

impl OpenBoundarySolver3D {
    /// Construct solver with a private FFT context
    pub fn new(geometry: GridGeometry) -> SolverResult<Self> {
        Self::with_context(geometry, &mut FftContext::new())
    }

    /// Construct solver using plans from `context`.
    ///
    /// This evaluates and transforms the integrated Green's function, which is the
    /// expensive step; subsequent calls to `solve` need only two transforms.
    pub fn with_context(geometry: GridGeometry, context: &mut FftContext) -> SolverResult<Self> {
        geometry.validate()?;
        let [nx, ny, nz] = geometry.cells();
        log::debug!(
            "building 3D integrated Green's function for {}x{}x{} cells, spacing {:?}",
            nx,
            ny,
            nz,
            geometry.spacing().as_slice()
        );
        let green = integrated_green_3d(&geometry);
        let kernel = Arc::new(SpectralKernel::new(&green, Ix3(nx, ny, nz), context));
        let workspace = kernel.make_workspace();
        Ok(Self {
            geometry,
            kernel,
            workspace,
        })
    }

    /// New solver sharing the transformed Green's function but with its own workspace.
    ///
    /// Use one fork per thread to solve concurrently.
    pub fn fork(&self) -> Self {
        Self {
            geometry: self.geometry,
            kernel: Arc::clone(&self.kernel),
            workspace: self.kernel.make_workspace(),
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Shared, read-only Green's function transform
    pub fn kernel(&self) -> &Arc<SpectralKernel<Ix3>> {
        &self.kernel
    }

    pub fn workspace(&self) -> &Workspace<Ix3> {
        &self.workspace
    }
}

impl PoissonSolver for OpenBoundarySolver3D {
    type Dim = Ix3;

    fn shape(&self) -> Ix3 {
        self.kernel.shape()
    }

    fn solve(&mut self, rho: ArrayView3<f64>) -> SolverResult<Array3<f64>> {
        self.kernel.solve_into(&mut self.workspace, rho)
    }
}

impl Info for OpenBoundarySolver3D {
    fn short_name(&self) -> Option<&'static str> {
        Some("fft-open-3d")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Open-boundary FFT Poisson solver with integrated Green's function")
    }
    fn citation(&self) -> Option<&'static str> {
        Some("doi:10.1103/PhysRevSTAB.9.044204")
    }
}
