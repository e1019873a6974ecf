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

use thiserror::Error;

/// Errors raised while constructing or running a solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Invalid grid spacing or cell count; no solver is constructed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Density shape differs from the constructed geometry; the solver stays usable
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
}

pub type SolverResult<T> = Result<T, SolverError>;
