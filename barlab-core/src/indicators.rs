//! Trailing indicators over a price series.
//!
//! Values are aligned one-to-one with the input; entries where the window
//! is not yet full are NaN. No value at index t uses data past index t.

/// Simple moving average over `window` trailing values.
///
/// The first `window - 1` entries are NaN (the window requires a full
/// history before producing a value). A NaN anywhere in the current window
/// makes that output NaN.
///
/// # Panics
/// Panics if `window == 0`.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "SMA window must be >= 1");

    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &values[(i + 1 - window)..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = slice.iter().sum::<f64>() / window as f64;
    }

    result
}
