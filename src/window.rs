//! Event windows around earnings dates and benchmark date alignment.

use crate::types::PriceHistory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Span of trading days kept around an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Trading days kept before the announcement day.
    pub pre_days: usize,
    /// Trading days kept after the announcement day.
    pub post_days: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            pre_days: 30,
            post_days: 30,
        }
    }
}

impl WindowConfig {
    pub fn new(pre_days: usize, post_days: usize) -> Self {
        Self {
            pre_days,
            post_days,
        }
    }

    /// Series index that is reported as day 0.
    pub fn anchor_offset(&self) -> i64 {
        self.pre_days as i64
    }

    /// Full window length in prices.
    pub fn span(&self) -> usize {
        self.pre_days + 1 + self.post_days
    }
}

/// Stock and benchmark prices over the same trading days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWindow {
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<f64>,
    pub benchmark_prices: Vec<f64>,
}

impl EventWindow {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Cut the window around `event_date`, keeping the announcement day at
    /// index `pre_days`.
    ///
    /// The announcement day is the first shared trading day on or after
    /// `event_date`. Returns `None` when there is no such day or fewer than
    /// `pre_days` sessions precede it. The tail may be shorter than
    /// `post_days`.
    pub fn around(&self, event_date: NaiveDate, config: &WindowConfig) -> Option<EventWindow> {
        let anchor = self.dates.partition_point(|d| *d < event_date);
        if anchor == self.len() {
            debug!("No trading day on or after {}", event_date);
            return None;
        }
        if anchor < config.pre_days {
            debug!(
                "Only {} sessions before {}, need {}",
                anchor, event_date, config.pre_days
            );
            return None;
        }

        let start = anchor - config.pre_days;
        let end = (anchor + config.post_days + 1).min(self.len());
        Some(EventWindow {
            dates: self.dates[start..end].to_vec(),
            prices: self.prices[start..end].to_vec(),
            benchmark_prices: self.benchmark_prices[start..end].to_vec(),
        })
    }
}

/// Keep only the days of `history` on which the benchmark also traded.
pub fn align_with_benchmark(history: &PriceHistory, benchmark: &PriceHistory) -> EventWindow {
    let points = history.points();
    let mut aligned = EventWindow {
        dates: Vec::with_capacity(points.len()),
        prices: Vec::with_capacity(points.len()),
        benchmark_prices: Vec::with_capacity(points.len()),
    };

    for point in points {
        if let Some(bench) = benchmark.price_on(point.date) {
            aligned.dates.push(point.date);
            aligned.prices.push(point.adj_close);
            aligned.benchmark_prices.push(bench);
        }
    }

    let dropped = points.len() - aligned.len();
    if dropped > 0 {
        debug!(
            "{}: dropped {} days missing from benchmark {}",
            history.symbol(),
            dropped,
            benchmark.symbol()
        );
    }
    aligned
}

/// Event window for one stock over the days it shares with the benchmark.
///
/// Alignment happens before the window is cut, so a benchmark holiday never
/// moves the announcement away from index `pre_days`.
pub fn extract(
    history: &PriceHistory,
    benchmark: &PriceHistory,
    event_date: NaiveDate,
    config: &WindowConfig,
) -> Option<EventWindow> {
    let window = align_with_benchmark(history, benchmark).around(event_date, config);
    if window.is_none() {
        debug!("{}: no event window around {}", history.symbol(), event_date);
    }
    window
}
