//! Per-symbol stock records and the arena that owns them.
//!
//! Groups never hold a `Stock` directly. They keep [`StockId`] keys into a
//! [`StockStore`], which stay valid however the store's backing storage moves.

use crate::classify::classify;
use crate::error::{EventStudyError, Result};
use crate::returns::{abnormal_returns, simple_returns};
use crate::types::{DayValue, EarningsRecord, SurpriseGroup};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Index;
use tracing::debug;

/// Stable key of a stock inside a [`StockStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockId(usize);

impl StockId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An earnings record together with its market data and derived series.
///
/// Surprise and group are fixed when the stock is created; prices, returns
/// and abnormal returns arrive later through [`StockStore::attach_market_data`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    record: EarningsRecord,
    surprise_pct: f64,
    group: SurpriseGroup,
    prices: Vec<f64>,
    returns: Vec<f64>,
    abnormal_returns: Vec<f64>,
    has_market_data: bool,
}

impl Stock {
    pub fn new(record: EarningsRecord) -> Self {
        let (surprise_pct, group) = classify(record.eps_estimate, record.actual_eps);
        Self {
            record,
            surprise_pct,
            group,
            prices: Vec::new(),
            returns: Vec::new(),
            abnormal_returns: Vec::new(),
            has_market_data: false,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.record.symbol
    }

    pub fn record(&self) -> &EarningsRecord {
        &self.record
    }

    pub fn eps_estimate(&self) -> f64 {
        self.record.eps_estimate
    }

    pub fn actual_eps(&self) -> f64 {
        self.record.actual_eps
    }

    pub fn earnings_date(&self) -> NaiveDate {
        self.record.earnings_date
    }

    pub fn surprise_pct(&self) -> f64 {
        self.surprise_pct
    }

    pub fn group(&self) -> SurpriseGroup {
        self.group
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn abnormal_returns(&self) -> &[f64] {
        &self.abnormal_returns
    }

    /// Whether market data has been attached, even if it was empty.
    pub fn has_market_data(&self) -> bool {
        self.has_market_data
    }

    fn attach_market_data(&mut self, prices: Vec<f64>, benchmark_returns: &[f64]) {
        self.returns = simple_returns(&prices);
        self.abnormal_returns = abnormal_returns(&self.returns, benchmark_returns);
        self.prices = prices;
        self.has_market_data = true;
    }

    /// Prices within `radius` days of the middle of the price series, labelled
    /// relative to that midpoint.
    pub fn price_window(&self, radius: usize) -> Vec<DayValue> {
        let n = self.prices.len();
        if n == 0 {
            return Vec::new();
        }
        let mid = n / 2;
        let start = mid.saturating_sub(radius);
        let end = (n - 1).min(mid + radius);

        (start..=end)
            .map(|i| DayValue {
                day: i as i64 - mid as i64,
                value: self.prices[i],
            })
            .collect()
    }

    /// Abnormal returns around the same midpoint as [`Stock::price_window`].
    ///
    /// Returns are one element shorter than prices, so the window is shifted
    /// one index earlier.
    pub fn abnormal_window(&self, radius: usize) -> Vec<DayValue> {
        let mid = (self.prices.len() / 2) as i64;
        let radius = radius as i64;
        let origin = mid - 1;
        let start = (mid - radius - 1).max(0);
        let end = (self.abnormal_returns.len() as i64 - 1).min(mid + radius - 1);

        if start > end {
            return Vec::new();
        }

        (start..=end)
            .map(|i| DayValue {
                day: i - origin,
                value: self.abnormal_returns[i as usize],
            })
            .collect()
    }
}

/// Arena of stocks keyed by [`StockId`], with a symbol index.
#[derive(Debug, Clone, Default)]
pub struct StockStore {
    stocks: Vec<Stock>,
    by_symbol: BTreeMap<String, StockId>,
}

impl StockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = EarningsRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert a record. A repeated symbol replaces the earlier record (and
    /// any market data attached to it) under the same id.
    pub fn insert(&mut self, record: EarningsRecord) -> StockId {
        if let Some(&id) = self.by_symbol.get(&record.symbol) {
            debug!("Replacing earnings record for {}", record.symbol);
            self.stocks[id.0] = Stock::new(record);
            return id;
        }

        let id = StockId(self.stocks.len());
        self.by_symbol.insert(record.symbol.clone(), id);
        self.stocks.push(Stock::new(record));
        id
    }

    /// Attach a chronological price series and the benchmark returns covering
    /// the same days, deriving returns and abnormal returns.
    pub fn attach_market_data(
        &mut self,
        symbol: &str,
        prices: Vec<f64>,
        benchmark_returns: &[f64],
    ) -> Result<StockId> {
        let id = self
            .id_of(symbol)
            .ok_or_else(|| EventStudyError::UnknownSymbol(symbol.to_string()))?;
        self.stocks[id.0].attach_market_data(prices, benchmark_returns);
        Ok(id)
    }

    pub fn get(&self, id: StockId) -> Option<&Stock> {
        self.stocks.get(id.0)
    }

    pub fn id_of(&self, symbol: &str) -> Option<StockId> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Stock> {
        self.id_of(symbol).map(|id| &self.stocks[id.0])
    }

    /// Stocks in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (StockId, &Stock)> {
        self.by_symbol
            .values()
            .map(move |&id| (id, &self.stocks[id.0]))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.by_symbol.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }
}

impl Index<StockId> for StockStore {
    type Output = Stock;

    fn index(&self, id: StockId) -> &Stock {
        &self.stocks[id.0]
    }
}
