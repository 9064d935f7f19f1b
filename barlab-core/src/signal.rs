//! Target-position signal generation.
//!
//! A moving-average crossover emits a *level*, not a cross event: the
//! target is long whenever the fast average sits above the slow average.
//! The simulation loop turns level changes into trades, with the fill
//! happening at the *next* bar's open — the lag belongs to the loop, not
//! the generator.

use crate::domain::Bar;
use crate::error::EngineError;
use crate::indicators::sma;

/// Fast/slow window pair for the crossover.
///
/// The windows need not satisfy `fast < slow`; the comparison is between
/// whatever two averages are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaCrossoverParams {
    pub fast: usize,
    pub slow: usize,
}

impl MaCrossoverParams {
    pub fn new(fast: usize, slow: usize) -> Result<Self, EngineError> {
        if fast == 0 || slow == 0 {
            return Err(EngineError::InvalidWindow);
        }
        Ok(Self { fast, slow })
    }

    /// Bars at the start of the series where the slower average is still
    /// undefined. Targets are 0 (flat) throughout.
    pub fn warmup_bars(&self) -> usize {
        self.fast.max(self.slow) - 1
    }

    /// Minimum bar count for a meaningful run: the warm-up period plus
    /// room for at least one signal bar and its next-open execution bar.
    pub fn min_bars(&self) -> usize {
        self.fast.max(self.slow) + 2
    }
}

/// Whether the generator emits long-only targets or symmetric ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMode {
    /// Targets in {0, 1}: long when fast > slow, flat otherwise.
    LongOnly,
    /// Targets in {-1, 0, 1}: sign of (fast - slow), 0 on exact tie.
    LongShort,
}

/// Computes the target-position series for a bar sequence.
///
/// Output is aligned one-to-one with `bars`. Undefined averages (warm-up,
/// NaN windows) always map to 0 in both modes. The value at index t uses
/// closes at or before t only.
pub fn crossover_targets(bars: &[Bar], params: &MaCrossoverParams, mode: SignalMode) -> Vec<i8> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let fast_ma = sma(&closes, params.fast);
    let slow_ma = sma(&closes, params.slow);

    fast_ma
        .iter()
        .zip(&slow_ma)
        .map(|(&fast, &slow)| {
            if fast.is_nan() || slow.is_nan() {
                return 0;
            }
            match mode {
                SignalMode::LongOnly => i8::from(fast > slow),
                SignalMode::LongShort => {
                    if fast > slow {
                        1
                    } else if fast < slow {
                        -1
                    } else {
                        0
                    }
                }
            }
        })
        .collect()
}
