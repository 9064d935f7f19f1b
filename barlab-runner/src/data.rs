//! Market data loading — Stooq CSV download, local cache, synthetic
//! fallback.
//!
//! The loader is the boundary that guarantees what the engine assumes:
//! strictly increasing dates and positive finite prices. Rows that fail
//! the price checks are dropped; duplicate dates are rejected outright.
//!
//! Synthetic bars are a seeded random walk for offline runs and tests —
//! explicitly requested, never silently substituted for real data.

use barlab_core::domain::Bar;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("download failed for '{symbol}': {reason}")]
    Download { symbol: String, reason: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("duplicate bar date {0}")]
    DuplicateDate(NaiveDate),

    #[error("no usable rows in '{path}'")]
    Empty { path: String },
}

/// Stooq daily-CSV endpoint for a symbol, e.g. `aapl.us`.
pub fn stooq_csv_url(symbol: &str) -> String {
    let symbol = symbol.trim().to_lowercase();
    format!("https://stooq.com/q/d/l/?s={symbol}&i=d")
}

/// Local cache file for a symbol's daily CSV.
pub fn cache_path(cache_dir: &Path, symbol: &str) -> PathBuf {
    let name = symbol.trim().to_lowercase().replace('/', "_");
    cache_dir.join(format!("{name}_stooq_d.csv"))
}

/// Downloads daily OHLCV CSV into `cache_dir` and returns the local path.
///
/// A cached file is reused unless `force` is set.
pub fn download_stooq_csv(
    symbol: &str,
    cache_dir: &Path,
    force: bool,
) -> Result<PathBuf, DataError> {
    std::fs::create_dir_all(cache_dir).map_err(|e| DataError::Io {
        path: cache_dir.display().to_string(),
        source: e,
    })?;

    let out_path = cache_path(cache_dir, symbol);
    if out_path.exists() && !force {
        return Ok(out_path);
    }

    let url = stooq_csv_url(symbol);
    let body = reqwest::blocking::get(&url)
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.bytes())
        .map_err(|e| DataError::Download {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

    std::fs::write(&out_path, &body).map_err(|e| DataError::Io {
        path: out_path.display().to_string(),
        source: e,
    })?;
    Ok(out_path)
}

/// Loads a Stooq-format OHLCV CSV into a validated bar sequence.
///
/// Expected columns: Date,Open,High,Low,Close,Volume (volume optional,
/// defaulting to 0). Rows whose prices fail to parse or are non-positive
/// are dropped. The result is sorted by date; duplicate dates are an
/// error, and a file with zero usable rows is an error.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let col = |name: &'static str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(DataError::MissingColumn(name))
    };
    let date_col = col("Date")?;
    let open_col = col("Open")?;
    let high_col = col("High")?;
    let low_col = col("Low")?;
    let close_col = col("Close")?;
    let volume_col = headers.iter().position(|h| h.eq_ignore_ascii_case("Volume"));

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(bar) = parse_row(&record, date_col, open_col, high_col, low_col, close_col, volume_col)
        else {
            continue; // malformed row: dropped, per the loader contract
        };
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(DataError::Empty {
            path: path.display().to_string(),
        });
    }

    bars.sort_by_key(|b| b.date);
    for pair in bars.windows(2) {
        if pair[0].date == pair[1].date {
            return Err(DataError::DuplicateDate(pair[0].date));
        }
    }

    Ok(bars)
}

fn parse_row(
    record: &csv::StringRecord,
    date_col: usize,
    open_col: usize,
    high_col: usize,
    low_col: usize,
    close_col: usize,
    volume_col: Option<usize>,
) -> Option<Bar> {
    let date = NaiveDate::parse_from_str(record.get(date_col)?.trim(), "%Y-%m-%d").ok()?;
    let price = |idx: usize| -> Option<f64> {
        let value: f64 = record.get(idx)?.trim().parse().ok()?;
        (value.is_finite() && value > 0.0).then_some(value)
    };
    let open = price(open_col)?;
    let high = price(high_col)?;
    let low = price(low_col)?;
    let close = price(close_col)?;
    let volume = volume_col
        .and_then(|idx| record.get(idx))
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    Some(Bar {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

/// Keeps bars inside the inclusive `[start, end]` range.
pub fn filter_date_range(
    bars: Vec<Bar>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Bar> {
    bars.into_iter()
        .filter(|bar| start.map_or(true, |s| bar.date >= s))
        .filter(|bar| end.map_or(true, |e| bar.date <= e))
        .collect()
}

/// Generates `n` daily bars from a seeded random walk.
///
/// The same seed always produces the same bars, so tests and offline
/// demo runs stay reproducible end to end.
pub fn synthetic_bars(n: usize, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    let mut close = 100.0_f64;

    (0..n)
        .map(|i| {
            let open = close;
            let drift: f64 = rng.gen_range(-0.02..0.02);
            close = (open * (1.0 + drift)).max(1.0);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
            let low = (open.min(close) * (1.0 - rng.gen_range(0.0..0.005))).max(0.01);
            Bar {
                date: start + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: rng.gen_range(100_000..5_000_000),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn url_and_cache_naming() {
        assert_eq!(
            stooq_csv_url(" AAPL.US "),
            "https://stooq.com/q/d/l/?s=aapl.us&i=d"
        );
        assert_eq!(
            cache_path(Path::new("data"), "BRK/B.us"),
            Path::new("data").join("brk_b.us_stooq_d.csv")
        );
    }

    #[test]
    fn loads_and_sorts_valid_rows() {
        let file = write_csv(
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-03,102,104,101,103,1200\n\
             2024-01-02,100,103,99,102,1000\n",
        );
        let bars = load_bars_csv(file.path()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 102.0);
        assert_eq!(bars[1].volume, 1200);
    }

    #[test]
    fn drops_malformed_rows() {
        let file = write_csv(
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-02,100,103,99,102,1000\n\
             2024-01-03,,104,101,103,1200\n\
             2024-01-04,0,104,101,103,1200\n\
             2024-01-05,abc,104,101,103,1200\n\
             2024-01-08,103,105,102,104,1500\n",
        );
        let bars = load_bars_csv(file.path()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }

    #[test]
    fn missing_volume_defaults_to_zero() {
        let file = write_csv(
            "Date,Open,High,Low,Close\n\
             2024-01-02,100,103,99,102\n",
        );
        let bars = load_bars_csv(file.path()).unwrap();
        assert_eq!(bars[0].volume, 0);
    }

    #[test]
    fn rejects_missing_price_column() {
        let file = write_csv("Date,Open,High,Low\n2024-01-02,100,103,99\n");
        assert!(matches!(
            load_bars_csv(file.path()),
            Err(DataError::MissingColumn("Close"))
        ));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let file = write_csv(
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-02,100,103,99,102,1000\n\
             2024-01-02,101,104,100,103,1100\n",
        );
        assert!(matches!(
            load_bars_csv(file.path()),
            Err(DataError::DuplicateDate(_))
        ));
    }

    #[test]
    fn rejects_empty_file() {
        let file = write_csv("Date,Open,High,Low,Close,Volume\n");
        assert!(matches!(
            load_bars_csv(file.path()),
            Err(DataError::Empty { .. })
        ));
    }

    #[test]
    fn date_range_filter_is_inclusive() {
        let bars = synthetic_bars(10, 1);
        let start = bars[2].date;
        let end = bars[5].date;
        let filtered = filter_date_range(bars, Some(start), Some(end));
        assert_eq!(filtered.len(), 4);
        assert_eq!(filtered.first().unwrap().date, start);
        assert_eq!(filtered.last().unwrap().date, end);
    }

    #[test]
    fn synthetic_bars_are_reproducible() {
        let a = synthetic_bars(50, 7);
        let b = synthetic_bars(50, 7);
        assert_eq!(a, b);

        let c = synthetic_bars(50, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn synthetic_bars_are_sane() {
        let bars = synthetic_bars(500, 42);
        assert_eq!(bars.len(), 500);
        for pair in bars.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        assert!(bars.iter().all(|b| b.is_sane()));
    }
}
