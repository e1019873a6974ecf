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

//! Mirror symmetry fill of a doubled grid.
//!
//! Along an axis of doubled length 2n, index `i` of the cyclic grid corresponds
//! to the offset `|fftfreq(2n)[i]| * 2n`, i.e. `0, 1, …, n, n-1, …, 1`.
//! Indices `n+1..2n` are thus copies of `n-1..1`.

use itertools::Itertools;
use ndarray::{ArrayViewMut, Dimension, Slice};

/// Set of axes that are reflected, one bit per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMask(pub u32);

impl AxisMask {
    #[inline]
    pub const fn contains(&self, axis: usize) -> bool {
        self.0 & (1 << axis) != 0
    }

    /// All non-empty masks for `ndim` axes: single axes first, then pairs, and so on
    pub fn all(ndim: usize) -> impl Iterator<Item = AxisMask> {
        (1..1u32 << ndim)
            .sorted_by_key(|mask| (mask.count_ones(), *mask))
            .map(AxisMask)
    }
}

/// Folded offset for index `i` on an axis of doubled length `2 * half`
#[inline]
pub const fn fold_index(i: usize, half: usize) -> usize {
    if i > half {
        2 * half - i
    } else {
        i
    }
}

/// Fill the region where exactly the axes in `mask` are in the mirrored half.
///
/// Mirrored axes cover indices `n+1..2n` and take values from `n-1..1`; the
/// remaining axes cover `0..=n`. Values are read only from the computed
/// octant `[0..=n]^d`, so masks may be applied in any order.
pub fn mirror_fill<D: Dimension>(array: &mut ArrayViewMut<f64, D>, mask: AxisMask) {
    let source = array
        .slice_each_axis(|ax| {
            let n = ax.len / 2;
            if mask.contains(ax.axis.index()) {
                // n-1, n-2, ..., 1
                Slice::new(1, Some(n as isize), -1)
            } else {
                Slice::from(0..=n)
            }
        })
        .to_owned();
    array
        .slice_each_axis_mut(|ax| {
            let n = ax.len / 2;
            if mask.contains(ax.axis.index()) {
                Slice::from(n + 1..)
            } else {
                Slice::from(0..=n)
            }
        })
        .assign(&source);
}

/// Populate all mirrored parts of a doubled array from its `[0..=n]^d` octant
///
/// Masks are applied per single axis, then pairwise, then all together.
pub fn mirror_octants<D: Dimension>(array: &mut ArrayViewMut<f64, D>) {
    debug_assert!(array.shape().iter().all(|n| n % 2 == 0));
    for mask in AxisMask::all(array.ndim()) {
        mirror_fill(array, mask);
    }
}
