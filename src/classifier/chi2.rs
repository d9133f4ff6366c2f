//! Inverse chi-square function for Fisher's method.

use crate::error::{DocclassError, Result};

/// Upper-tail probability of a chi-square statistic with even degrees of freedom.
///
/// Computes `e^{-m} * Σ_{i < dof/2} m^i / i!` with `m = chi / 2`, capped at 1.0.
/// Terms are accumulated in log space so large statistics do not underflow
/// before the later terms are added.
///
/// # Errors
///
/// Fails with `NumericDegenerate` when `dof` is odd or smaller than 2, or when
/// `chi` is negative or NaN. An infinite `chi` yields 0.0.
///
/// ```
/// use docclass::classifier::invchi2;
///
/// assert_eq!(invchi2(0.0, 4).unwrap(), 1.0);
/// assert!(invchi2(10.0, 4).unwrap() < 0.05);
/// ```
pub fn invchi2(chi: f64, dof: usize) -> Result<f64> {
    if dof < 2 || dof % 2 != 0 {
        return Err(DocclassError::numeric(format!(
            "inverse chi-square needs an even number of degrees of freedom >= 2, got {dof}"
        )));
    }
    if chi.is_nan() || chi < 0.0 {
        return Err(DocclassError::numeric(format!(
            "inverse chi-square statistic must be non-negative, got {chi}"
        )));
    }
    if chi == f64::INFINITY {
        return Ok(0.0);
    }

    let m = chi / 2.0;
    let ln_m = m.ln();
    let mut ln_term = -m;
    let mut sum = ln_term.exp();

    for i in 1..dof / 2 {
        ln_term += ln_m - (i as f64).ln();
        sum += ln_term.exp();
    }

    Ok(sum.min(1.0))
}
