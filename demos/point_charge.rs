//! Potential and field of a Gaussian charge cloud on an open-boundary grid.
//!
//! Compares the solved potential along the x axis with the Coulomb potential
//! of a point charge carrying the same total charge.
//!
//! Run with: `RUST_LOG=debug cargo run --example point_charge`

use fieldsolver::field::electric_field;
use fieldsolver::{GridGeometry, Info, OpenBoundarySolver3D, PoissonSolver, COULOMB_PREFACTOR};
use ndarray::Array3;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let n = 33;
    let spacing = 1e-3; // m
    let sigma = 1.5e-3; // m
    let total_charge = 1e-12; // C
    let centre = (n / 2) as f64 * spacing;

    let geometry = GridGeometry::new(spacing, spacing, spacing, n, n, n)?;
    let mut solver = OpenBoundarySolver3D::new(geometry)?;

    let mut rho = Array3::from_shape_fn((n, n, n), |(i, j, k)| {
        let r2 = [i, j, k]
            .iter()
            .map(|&q| (q as f64 * spacing - centre).powi(2))
            .sum::<f64>();
        (-0.5 * r2 / (sigma * sigma)).exp()
    });
    let norm = total_charge / (rho.sum() * geometry.cell_volume());
    rho.mapv_inplace(|v| v * norm);

    let phi = solver.solve(rho.view())?;
    let field = electric_field(&phi, &geometry)?;

    println!(
        "{} ({}), imaginary residual {:.2e}",
        solver.long_name().unwrap_or_default(),
        solver.url().unwrap_or_default(),
        solver.workspace().imaginary_residual()
    );
    println!();
    println!(
        "{:>10} {:>14} {:>14} {:>14}",
        "r (mm)", "phi (V)", "point (V)", "Ex (V/m)"
    );
    for i in (n / 2 + 1)..n {
        let r = i as f64 * spacing - centre;
        let mid = n / 2;
        println!(
            "{:>10.2} {:>14.6e} {:>14.6e} {:>14.6e}",
            r * 1e3,
            phi[[i, mid, mid]],
            COULOMB_PREFACTOR * total_charge / r,
            field[[i, mid, mid]].x
        );
    }
    Ok(())
}
