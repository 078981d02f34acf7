//! Stable basis terms for the standard correction ansatz.
//!
//! The 6-parameter correction function decomposes into an intercept plus two
//! shape terms in `L = log10(pt)`:
//!
//! - `log_falloff(pt, offset) = 1 / (L^2 + offset)`
//! - `log_gauss(pt, width, center) = exp(-width * (L - center)^2)`
//!
//! Numerical notes:
//! - `log10` of a non-positive pt is NaN, so pt is floored at a tiny positive
//!   value; trigger jets always carry positive pt, the floor only matters for
//!   hostile stored parameters.
//! - The falloff denominator is not guarded: stored `offset` values are
//!   positive for any sane table, and a zero denominator yields an infinite
//!   factor that the applier's sanity window already discards.

/// Floor for pt before taking `log10`.
const PT_EPS: f64 = 1e-9;

/// `log10(pt)` with the pt floor applied.
pub fn log10_pt(pt: f64) -> f64 {
    pt.max(PT_EPS).log10()
}

/// Compute `1 / ((log10 pt)^2 + offset)`.
pub fn log_falloff(pt: f64, offset: f64) -> f64 {
    let l = log10_pt(pt);
    1.0 / (l * l + offset)
}

/// Compute `exp(-width * (log10 pt - center)^2)`.
pub fn log_gauss(pt: f64, width: f64, center: f64) -> f64 {
    let d = log10_pt(pt) - center;
    (-width * d * d).exp()
}
