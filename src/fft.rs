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

//! # Multidimensional FFT on ndarray grids
//!
//! Thin layer on top of `rustfft` that transforms every axis of an
//! [`ndarray::Array`] in turn. Conventions follow numpy: the forward transform is
//! unnormalized and the inverse transform is scaled by 1/N.

use ndarray::{Array, Axis, Dimension};
use num::complex::Complex64;
use num::Zero;
use rustfft::{Fft, FftPlanner, Length};
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Execution context for spectral transforms.
///
/// Holds the FFT planner and its plan cache. Pass the same context to several
/// solver constructors to reuse plans; nothing is shared implicitly.
pub struct FftContext {
    planner: FftPlanner<f64>,
}

impl FftContext {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Plan forward and inverse transforms along every axis of `shape`
    pub fn plan(&mut self, shape: &[usize]) -> MultiFft {
        let forward: Vec<_> = shape
            .iter()
            .map(|&n| self.planner.plan_fft_forward(n))
            .collect();
        let inverse: Vec<_> = shape
            .iter()
            .map(|&n| self.planner.plan_fft_inverse(n))
            .collect();
        let scratch_len = forward
            .iter()
            .chain(inverse.iter())
            .map(|fft| fft.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        MultiFft {
            shape: shape.to_vec(),
            forward,
            inverse,
            scratch_len,
        }
    }
}

impl Default for FftContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for FftContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftContext").finish_non_exhaustive()
    }
}

/// Reusable buffers for [`MultiFft`]: one lane copy and the rustfft scratch
#[derive(Debug, Clone, Default)]
pub struct FftScratch {
    lane: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

/// Forward and inverse plans for each axis of a fixed shape
#[derive(Clone)]
pub struct MultiFft {
    shape: Vec<usize>,
    forward: Vec<Arc<dyn Fft<f64>>>,
    inverse: Vec<Arc<dyn Fft<f64>>>,
    scratch_len: usize,
}

impl MultiFft {
    /// Shape the plans were made for
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Buffers large enough for any axis of this transform
    pub fn make_scratch(&self) -> FftScratch {
        let max_len = self.shape.iter().copied().max().unwrap_or(0);
        FftScratch {
            lane: Vec::with_capacity(max_len),
            scratch: vec![Complex64::zero(); self.scratch_len],
        }
    }

    /// In-place unnormalized forward transform
    pub fn forward<D: Dimension>(&self, data: &mut Array<Complex64, D>, scratch: &mut FftScratch) {
        self.process_axes(&self.forward, data, scratch);
    }

    /// In-place inverse transform, scaled by 1/N
    pub fn inverse<D: Dimension>(&self, data: &mut Array<Complex64, D>, scratch: &mut FftScratch) {
        self.process_axes(&self.inverse, data, scratch);
        let scale = 1.0 / data.len() as f64;
        data.mapv_inplace(|c| c * scale);
    }

    /// Transform each axis in turn, copying every lane through a contiguous buffer
    fn process_axes<D: Dimension>(
        &self,
        plans: &[Arc<dyn Fft<f64>>],
        data: &mut Array<Complex64, D>,
        buffers: &mut FftScratch,
    ) {
        debug_assert_eq!(data.shape(), self.shape.as_slice());
        let FftScratch { lane, scratch } = buffers;
        if scratch.len() < self.scratch_len {
            scratch.resize(self.scratch_len, Complex64::zero());
        }
        for (axis, fft) in plans.iter().enumerate() {
            debug_assert_eq!(fft.len(), data.len_of(Axis(axis)));
            let scratch = &mut scratch[..fft.get_inplace_scratch_len()];
            for mut view in data.lanes_mut(Axis(axis)) {
                lane.clear();
                lane.extend(view.iter().copied());
                fft.process_with_scratch(lane, scratch);
                view.iter_mut().zip(lane.iter()).for_each(|(v, c)| *v = *c);
            }
        }
    }
}

impl Debug for MultiFft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiFft")
            .field("shape", &self.shape)
            .field("scratch_len", &self.scratch_len)
            .finish()
    }
}
