//! Summary statistics and the standard normal CDF.
//!
//! The win-probability model treats a party's true vote share as normally
//! distributed, so the only distribution machinery we need is a scalar CDF.
//! We use the Abramowitz & Stegun (1964) rational approximation 26.2.17,
//! which is accurate to better than 7.5e-8 across all z — far below the
//! resolution of the probabilities we report.

/// Mean of a slice. Returns `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n-1 denominator).
///
/// Returns `None` when fewer than 2 values are present: a single observation
/// carries no spread information, and callers are expected to substitute a
/// fallback dispersion.
pub fn sample_stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// CDF of the normal distribution with the given mean and standard deviation.
///
/// `sd` must be positive; callers guarantee this by construction (the
/// pipeline refuses to run without a positive fallback dispersion).
pub fn normal_cdf(x: f64, mean: f64, sd: f64) -> f64 {
    std_normal_cdf((x - mean) / sd)
}

/// Standard normal CDF via Abramowitz & Stegun 26.2.17.
pub fn std_normal_cdf(z: f64) -> f64 {
    if z < -8.0 {
        return 0.0;
    }
    if z > 8.0 {
        return 1.0;
    }
    if z < 0.0 {
        return 1.0 - std_normal_cdf(-z);
    }

    const B0: f64 = 0.2316419;
    const B1: f64 = 0.319381530;
    const B2: f64 = -0.356563782;
    const B3: f64 = 1.781477937;
    const B4: f64 = -1.821255978;
    const B5: f64 = 1.330274429;

    let t = 1.0 / (1.0 + B0 * z);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let poly = B1 * t + B2 * t2 + B3 * t3 + B4 * t4 + B5 * t5;
    let pdf = (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt();

    1.0 - pdf * poly
}
