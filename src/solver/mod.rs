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

//! # Open-boundary Poisson solvers
//!
//! The potential φ = G ∗ ρ of an isolated charge density is a linear convolution.
//! FFTs compute cyclic convolutions, so the density is zero padded into a grid twice
//! the size along every axis and convolved with the mirrored integrated Green's function.
//! On the physical sub-block the cyclic result then equals the open-boundary one.
//!
//! The transformed Green's function is computed once per geometry and kept in an
//! immutable [`SpectralKernel`] that may be shared between threads, while each solver
//! owns a mutable [`Workspace`] that is reused by every call to `solve`.

mod open2d;
mod open3d;

pub use open2d::{OpenBoundarySolver2D, Solver2p5D};
pub use open3d::OpenBoundarySolver3D;

use crate::fft::{FftContext, FftScratch, MultiFft};
use crate::{SolverError, SolverResult};
use ndarray::{Array, ArrayView, Dimension, Slice, Zip};
use num::complex::Complex64;
use num::Zero;

/// Relative size of an imaginary part above which a transform is reported
const IMAGINARY_TOLERANCE: f64 = 1e-8;

/// Largest imaginary part relative to the largest real part
fn relative_imaginary<'a>(values: impl IntoIterator<Item = &'a Complex64>) -> f64 {
    let (max_re, max_im) = values.into_iter().fold((0.0f64, 0.0f64), |(re, im), c| {
        (re.max(c.re.abs()), im.max(c.im.abs()))
    });
    if max_re > 0.0 {
        max_im / max_re
    } else {
        max_im
    }
}

/// Poisson solver mapping a charge density to a potential of the same shape
pub trait PoissonSolver {
    /// Grid dimensionality
    type Dim: Dimension;

    /// Shape of the density and potential arrays
    fn shape(&self) -> Self::Dim;

    /// Potential due to the density `rho`.
    ///
    /// Takes a view so that slices of larger arrays can be solved without copying.
    ///
    /// Fails with [`SolverError::ShapeMismatch`] before any work is done
    /// if `rho` does not have the shape given by [`PoissonSolver::shape`].
    fn solve(&mut self, rho: ArrayView<f64, Self::Dim>) -> SolverResult<Array<f64, Self::Dim>>;
}

/// Fourier transform of a mirrored Green's function on a doubled grid.
///
/// Read-only after construction; holds the FFT plans needed to use it.
#[derive(Debug)]
pub struct SpectralKernel<D: Dimension> {
    /// Physical grid shape
    shape: D,
    /// Transform of the doubled, mirrored Green's function
    transform: Array<Complex64, D>,
    /// Relative imaginary part of `transform`
    imaginary_residual: f64,
    fft: MultiFft,
}

impl<D: Dimension> SpectralKernel<D> {
    /// Transform a doubled Green's function array.
    ///
    /// `green` must have twice the extent of `shape` along every axis. A correctly
    /// mirrored Green's function is even on the cyclic grid, so its transform is real;
    /// a warning is logged otherwise, which points to a sign, mirroring or padding error.
    pub fn new(green: &Array<f64, D>, shape: D, context: &mut FftContext) -> Self {
        debug_assert!(green
            .shape()
            .iter()
            .zip(shape.slice())
            .all(|(&m, &n)| m == 2 * n));
        let fft = context.plan(green.shape());
        let mut transform = green.mapv(|g| Complex64::new(g, 0.0));
        fft.forward(&mut transform, &mut fft.make_scratch());
        let imaginary_residual = relative_imaginary(&transform);
        if imaginary_residual > IMAGINARY_TOLERANCE {
            log::warn!(
                "Green's function transform has imaginary residual {:.3e} above {:.1e}; kernel is not even",
                imaginary_residual,
                IMAGINARY_TOLERANCE
            );
        }
        Self {
            shape,
            transform,
            imaginary_residual,
            fft,
        }
    }

    /// Largest imaginary part of the transformed Green's function relative to the
    /// largest real part. Round-off level for an even kernel.
    pub fn imaginary_residual(&self) -> f64 {
        self.imaginary_residual
    }

    /// Physical grid shape
    pub fn shape(&self) -> D {
        self.shape.clone()
    }

    /// Transformed Green's function on the doubled grid
    pub fn transform(&self) -> &Array<Complex64, D> {
        &self.transform
    }

    /// Fresh workspace matching this kernel
    pub fn make_workspace(&self) -> Workspace<D> {
        Workspace {
            buffer: Array::zeros(self.transform.raw_dim()),
            scratch: self.fft.make_scratch(),
            imaginary_residual: 0.0,
        }
    }

    /// Convolve `rho` with the Green's function using `workspace` as scratch space
    pub fn solve_into(
        &self,
        workspace: &mut Workspace<D>,
        rho: ArrayView<f64, D>,
    ) -> SolverResult<Array<f64, D>> {
        if rho.raw_dim() != self.shape {
            return Err(SolverError::ShapeMismatch {
                expected: self.shape.slice().to_vec(),
                found: rho.shape().to_vec(),
            });
        }
        let shape = self.shape.slice();
        let buffer = &mut workspace.buffer;

        // stale data from a previous call must not leak into the padding
        buffer.fill(Complex64::zero());
        Zip::from(buffer.slice_each_axis_mut(|ax| Slice::from(0..shape[ax.axis.index()])))
            .and(&rho)
            .for_each(|b, &r| *b = Complex64::new(r, 0.0));

        self.fft.forward(buffer, &mut workspace.scratch);
        Zip::from(&mut *buffer)
            .and(&self.transform)
            .for_each(|b, &g| *b *= g);
        self.fft.inverse(buffer, &mut workspace.scratch);

        let physical = buffer.slice_each_axis(|ax| Slice::from(0..shape[ax.axis.index()]));
        workspace.imaginary_residual = relative_imaginary(&physical);
        if workspace.imaginary_residual > IMAGINARY_TOLERANCE {
            log::warn!(
                "imaginary residual {:.3e} after inverse transform exceeds {:.1e}",
                workspace.imaginary_residual,
                IMAGINARY_TOLERANCE
            );
        }
        Ok(physical.mapv(|c| c.re))
    }
}

/// Mutable scratch space for a single writer.
///
/// Holds the doubled density buffer, which after the inverse transform contains
/// the doubled potential, together with the FFT scratch buffers.
#[derive(Debug, Clone)]
pub struct Workspace<D: Dimension> {
    buffer: Array<Complex64, D>,
    scratch: FftScratch,
    imaginary_residual: f64,
}

impl<D: Dimension> Workspace<D> {
    /// Largest imaginary part on the physical sub-block after the last solve,
    /// relative to the largest real part.
    ///
    /// Density and Green's function are both real, so this measures round-off in the
    /// transforms only. Kernel symmetry is checked by
    /// [`SpectralKernel::imaginary_residual`].
    pub fn imaginary_residual(&self) -> f64 {
        self.imaginary_residual
    }
}
