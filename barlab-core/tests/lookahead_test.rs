//! Look-ahead contamination tests.
//!
//! Invariant: nothing observable at bar t — target, trade, snapshot — may
//! depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series and on the full series, and
//! assert the shared prefix is identical. Any difference means future
//! data leaked into past values.

use barlab_core::{
    crossover_targets, run_simulation, MaCrossoverParams, SignalMode, SimulationConfig,
};
use barlab_core::domain::Bar;
use chrono::NaiveDate;

/// Generate N bars of synthetic OHLCV data with a deterministic
/// pseudo-random walk (simple LCG; no RNG dependency in this crate).
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;

    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.05; // -5.0 to +5.0
        price = (price + change).max(10.0);

        let open = price - 0.5;
        let close = price + 0.3;
        bars.push(Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high: open.max(close) + 2.0,
            low: (open.min(close) - 2.0).max(0.01),
            close,
            volume: 1_000 + i as u64 * 100,
        });
    }

    bars
}

#[test]
fn targets_are_truncation_invariant() {
    let bars = make_test_bars(200);
    for &(fast, slow) in &[(5_usize, 20_usize), (10, 50), (20, 100)] {
        let params = MaCrossoverParams::new(fast, slow).unwrap();
        let full = crossover_targets(&bars, &params, SignalMode::LongOnly);
        let truncated = crossover_targets(&bars[..100], &params, SignalMode::LongOnly);

        assert_eq!(
            &full[..100],
            &truncated[..],
            "MA({fast},{slow}): target series changed when future bars were appended"
        );
    }
}

#[test]
fn long_short_targets_are_truncation_invariant() {
    let bars = make_test_bars(200);
    let params = MaCrossoverParams::new(10, 30).unwrap();
    let full = crossover_targets(&bars, &params, SignalMode::LongShort);
    let truncated = crossover_targets(&bars[..100], &params, SignalMode::LongShort);
    assert_eq!(&full[..100], &truncated[..]);
}

/// Dropping the final bar must leave every earlier trade and snapshot
/// untouched — the run's history cannot depend on bars that have not
/// happened yet.
#[test]
fn run_prefix_is_independent_of_later_bars() {
    let bars = make_test_bars(150);
    let params = MaCrossoverParams::new(5, 20).unwrap();
    let config = SimulationConfig::default();

    let full_targets = crossover_targets(&bars, &params, SignalMode::LongOnly);
    let full = run_simulation(&bars, &full_targets, &config).unwrap();

    let truncated_bars = &bars[..149];
    let truncated_targets = crossover_targets(truncated_bars, &params, SignalMode::LongOnly);
    let truncated = run_simulation(truncated_bars, &truncated_targets, &config).unwrap();

    // Snapshots agree bar for bar over the shared range.
    assert_eq!(&full.equity_curve[..149], &truncated.equity_curve[..]);

    // Trades agree except for any trade dated on the dropped bar.
    let last_date = bars[149].date;
    let full_prefix: Vec<_> = full
        .trades
        .iter()
        .filter(|t| t.date < last_date)
        .cloned()
        .collect();
    assert_eq!(full_prefix, truncated.trades);
}

/// Rewriting the final bar's close must not change anything before it:
/// the close of bar t is only ever acted on at bar t+1, which here does
/// not exist.
#[test]
fn final_close_cannot_affect_earlier_history() {
    let mut bars = make_test_bars(120);
    let params = MaCrossoverParams::new(5, 20).unwrap();
    let config = SimulationConfig::default();

    let targets = crossover_targets(&bars, &params, SignalMode::LongOnly);
    let baseline = run_simulation(&bars, &targets, &config).unwrap();

    let last = bars.len() - 1;
    bars[last].close *= 2.0;
    bars[last].high = bars[last].high.max(bars[last].close);
    let shocked_targets = crossover_targets(&bars, &params, SignalMode::LongOnly);
    let shocked = run_simulation(&bars, &shocked_targets, &config).unwrap();

    assert_eq!(
        &baseline.equity_curve[..last],
        &shocked.equity_curve[..last]
    );
    assert_eq!(baseline.trades, shocked.trades);
}
