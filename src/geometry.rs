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

//! Rectangular grid geometries.

use crate::{SolverError, SolverResult, Vector3};
use num::complex::Complex64;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Check that a spacing is strictly positive and finite
fn check_spacing(name: &str, spacing: f64) -> SolverResult<()> {
    if spacing > 0.0 && spacing.is_finite() {
        Ok(())
    } else {
        Err(SolverError::Configuration(format!(
            "spacing {name} must be positive and finite, got {spacing}"
        )))
    }
}

/// Largest number of complex elements an array may hold
const MAX_ELEMENTS: usize = isize::MAX as usize / std::mem::size_of::<Complex64>();

/// Check cell counts and that the doubled complex grid can be allocated
fn check_cells(cells: &[usize]) -> SolverResult<()> {
    if let Some(n) = cells.iter().find(|&&n| n < 1) {
        return Err(SolverError::Configuration(format!(
            "cell counts must be at least one, got {n}"
        )));
    }
    cells
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n.checked_mul(2)?))
        .filter(|&elements| elements <= MAX_ELEMENTS)
        .map(|_| ())
        .ok_or_else(|| {
            SolverError::Configuration(format!("doubled grid for {cells:?} cells is too large"))
        })
}

/// Three dimensional grid with cell counts (nx, ny, nz) and spacings (dx, dy, dz).
///
/// # Examples
/// ~~~
/// use fieldsolver::GridGeometry;
/// let geometry = GridGeometry::new(0.1, 0.2, 0.5, 10, 20, 4).unwrap();
/// assert_eq!(geometry.cells(), [10, 20, 4]);
/// assert_eq!(geometry.doubled_cells(), [20, 40, 8]);
/// assert!(GridGeometry::new(0.0, 0.2, 0.5, 10, 20, 4).is_err());
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct GridGeometry {
    dx: f64,
    dy: f64,
    dz: f64,
    nx: usize,
    ny: usize,
    nz: usize,
}

impl GridGeometry {
    /// Create a validated geometry from spacings and cell counts
    pub fn new(dx: f64, dy: f64, dz: f64, nx: usize, ny: usize, nz: usize) -> SolverResult<Self> {
        let geometry = Self {
            dx,
            dy,
            dz,
            nx,
            ny,
            nz,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Create from a spacing vector and cell counts
    pub fn from_spacing(spacing: Vector3, cells: [usize; 3]) -> SolverResult<Self> {
        Self::new(
            spacing.x, spacing.y, spacing.z, cells[0], cells[1], cells[2],
        )
    }

    /// Check spacings and cell counts.
    ///
    /// Geometries read from a configuration file bypass [`GridGeometry::new`],
    /// so solvers call this again on construction.
    pub fn validate(&self) -> SolverResult<()> {
        check_spacing("dx", self.dx)?;
        check_spacing("dy", self.dy)?;
        check_spacing("dz", self.dz)?;
        check_cells(&self.cells())
    }

    /// Cell spacings (dx, dy, dz)
    pub fn spacing(&self) -> Vector3 {
        Vector3::new(self.dx, self.dy, self.dz)
    }

    /// Cell counts (nx, ny, nz)
    pub const fn cells(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    /// Cell counts of the zero padded grid, (2nx, 2ny, 2nz)
    pub const fn doubled_cells(&self) -> [usize; 3] {
        [2 * self.nx, 2 * self.ny, 2 * self.nz]
    }

    pub fn cell_volume(&self) -> f64 {
        self.dx * self.dy * self.dz
    }

    /// Transverse slab spanned by the x and y axes
    pub const fn transverse(&self) -> SlabGeometry {
        SlabGeometry {
            dx: self.dx,
            dy: self.dy,
            nx: self.nx,
            ny: self.ny,
        }
    }
}

/// Two dimensional grid with cell counts (nx, ny) and spacings (dx, dy)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct SlabGeometry {
    dx: f64,
    dy: f64,
    nx: usize,
    ny: usize,
}

impl SlabGeometry {
    pub fn new(dx: f64, dy: f64, nx: usize, ny: usize) -> SolverResult<Self> {
        let geometry = Self { dx, dy, nx, ny };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> SolverResult<()> {
        check_spacing("dx", self.dx)?;
        check_spacing("dy", self.dy)?;
        check_cells(&self.cells())
    }

    /// Cell spacings (dx, dy)
    pub const fn spacing(&self) -> [f64; 2] {
        [self.dx, self.dy]
    }

    /// Cell counts (nx, ny)
    pub const fn cells(&self) -> [usize; 2] {
        [self.nx, self.ny]
    }

    pub const fn doubled_cells(&self) -> [usize; 2] {
        [2 * self.nx, 2 * self.ny]
    }

    pub fn cell_area(&self) -> f64 {
        self.dx * self.dy
    }
}
