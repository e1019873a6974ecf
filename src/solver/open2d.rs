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

//! Transverse solvers based on the logarithmic line-charge kernel.

use super::{PoissonSolver, SpectralKernel, Workspace};
use crate::green::integrated_green_2d;
use crate::{FftContext, GridGeometry, Info, SlabGeometry, SolverError, SolverResult};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, Ix2, Ix3};
use std::sync::Arc;

/// Transformed 2D kernel for a slab geometry
fn slab_kernel(
    geometry: &SlabGeometry,
    context: &mut FftContext,
) -> SolverResult<Arc<SpectralKernel<Ix2>>> {
    geometry.validate()?;
    let [nx, ny] = geometry.cells();
    log::debug!(
        "building 2D integrated Green's function for {}x{} cells, spacing {:?}",
        nx,
        ny,
        geometry.spacing()
    );
    let green = integrated_green_2d(geometry);
    Ok(Arc::new(SpectralKernel::new(&green, Ix2(nx, ny), context)))
}

/// Open-boundary FFT Poisson solver on a two dimensional slab.
///
/// The density (C/m³) describes a beam that is uniform and infinitely long along z,
/// so each cell carries the line charge ρ·dx·dy. The returned potential (V) is
/// relative to the reference φ(r = 1 m) = 0 of the logarithmic kernel.
///
/// # Examples
/// ~~~
/// use fieldsolver::{OpenBoundarySolver2D, PoissonSolver, SlabGeometry};
/// use ndarray::Array2;
/// let geometry = SlabGeometry::new(0.1, 0.1, 16, 16).unwrap();
/// let mut solver = OpenBoundarySolver2D::new(geometry).unwrap();
/// let mut rho = Array2::zeros((16, 16));
/// rho[[8, 8]] = 1e-9;
/// let phi = solver.solve(rho.view()).unwrap();
/// // the potential of a positive line charge falls off with distance
/// assert!(phi[[9, 8]] > phi[[12, 8]]);
/// assert!(phi[[12, 8]] > phi[[15, 8]]);
/// ~~~
#[derive(Debug)]
pub struct OpenBoundarySolver2D {
    geometry: SlabGeometry,
    kernel: Arc<SpectralKernel<Ix2>>,
    workspace: Workspace<Ix2>,
}

impl OpenBoundarySolver2D {
    pub fn new(geometry: SlabGeometry) -> SolverResult<Self> {
        Self::with_context(geometry, &mut FftContext::new())
    }

    pub fn with_context(geometry: SlabGeometry, context: &mut FftContext) -> SolverResult<Self> {
        let kernel = slab_kernel(&geometry, context)?;
        let workspace = kernel.make_workspace();
        Ok(Self {
            geometry,
            kernel,
            workspace,
        })
    }

    /// New solver sharing the transformed Green's function but with its own workspace
    pub fn fork(&self) -> Self {
        Self {
            geometry: self.geometry,
            kernel: Arc::clone(&self.kernel),
            workspace: self.kernel.make_workspace(),
        }
    }

    pub fn geometry(&self) -> &SlabGeometry {
        &self.geometry
    }

    pub fn workspace(&self) -> &Workspace<Ix2> {
        &self.workspace
    }
}

impl PoissonSolver for OpenBoundarySolver2D {
    type Dim = Ix2;

    fn shape(&self) -> Ix2 {
        self.kernel.shape()
    }

    fn solve(&mut self, rho: ArrayView2<f64>) -> SolverResult<Array2<f64>> {
        self.kernel.solve_into(&mut self.workspace, rho)
    }
}

impl Info for OpenBoundarySolver2D {
    fn short_name(&self) -> Option<&'static str> {
        Some("fft-open-2d")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Open-boundary FFT Poisson solver for line charges")
    }
}

/// Transverse space-charge solver on a three dimensional grid.
///
/// Every longitudinal slice `rho[.., .., k]` is treated as a uniform, infinitely
/// long beam and solved independently with the 2D kernel, as for
/// [`OpenBoundarySolver2D`]. The longitudinal spacing `dz` does not enter.
#[derive(Debug)]
pub struct Solver2p5D {
    geometry: GridGeometry,
    kernel: Arc<SpectralKernel<Ix2>>,
    workspace: Workspace<Ix2>,
}

impl Solver2p5D {
    pub fn new(geometry: GridGeometry) -> SolverResult<Self> {
        Self::with_context(geometry, &mut FftContext::new())
    }

    pub fn with_context(geometry: GridGeometry, context: &mut FftContext) -> SolverResult<Self> {
        geometry.validate()?;
        let kernel = slab_kernel(&geometry.transverse(), context)?;
        let workspace = kernel.make_workspace();
        Ok(Self {
            geometry,
            kernel,
            workspace,
        })
    }

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
}

impl PoissonSolver for Solver2p5D {
    type Dim = Ix3;

    fn shape(&self) -> Ix3 {
        let [nx, ny, nz] = self.geometry.cells();
        Ix3(nx, ny, nz)
    }

    fn solve(&mut self, rho: ArrayView3<f64>) -> SolverResult<Array3<f64>> {
        if rho.raw_dim() != self.shape() {
            return Err(SolverError::ShapeMismatch {
                expected: self.geometry.cells().to_vec(),
                found: rho.shape().to_vec(),
            });
        }
        let mut phi = Array3::zeros(rho.raw_dim());
        for (slice, mut phi_slice) in rho
            .axis_iter(Axis(2))
            .zip(phi.axis_iter_mut(Axis(2)))
        {
            let solved = self.kernel.solve_into(&mut self.workspace, slice)?;
            phi_slice.assign(&solved);
        }
        Ok(phi)
    }
}

impl Info for Solver2p5D {
    fn short_name(&self) -> Option<&'static str> {
        Some("fft-open-2.5d")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Slice-by-slice transverse open-boundary FFT Poisson solver")
    }
}
