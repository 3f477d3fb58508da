//! Event-study facade tying stocks, groups and the bootstrap together.

use crate::bootstrap::{BootstrapConfig, BootstrapEngine, BootstrapResult};
use crate::error::{EventStudyError, Result};
use crate::group::{Group, GroupMetrics, GroupSet};
use crate::returns::simple_returns;
use crate::stock::{Stock, StockStore};
use crate::types::{CaarTable, DayValue, EarningsRecord, PriceHistory, SurpriseGroup};
use crate::window::{self, WindowConfig};
use rand::Rng;
use std::collections::HashMap;
use tracing::{info, warn};

/// A classified set of stocks with fixed group membership.
///
/// Built once from a populated [`StockStore`]; afterwards the store is only
/// read, so group metrics are pure functions of the member data.
#[derive(Debug, Clone)]
pub struct EventStudy {
    store: StockStore,
    groups: GroupSet,
    anchor_offset: i64,
}

impl EventStudy {
    /// Classify a populated store. `anchor_offset` is the series index
    /// reported as event day 0.
    pub fn new(store: StockStore, anchor_offset: i64) -> Self {
        let groups = GroupSet::classify(&store);
        info!(
            "Classified {} of {} stocks: Beat {}, Meet {}, Miss {}",
            groups.total(),
            store.len(),
            groups.get(SurpriseGroup::Beat).len(),
            groups.get(SurpriseGroup::Meet).len(),
            groups.get(SurpriseGroup::Miss).len()
        );

        Self {
            store,
            groups,
            anchor_offset,
        }
    }

    /// Build from pre-windowed price series sharing one benchmark series.
    ///
    /// Records without an entry in `prices` stay ungrouped.
    pub fn from_price_series(
        records: impl IntoIterator<Item = EarningsRecord>,
        prices: &HashMap<String, Vec<f64>>,
        benchmark_prices: &[f64],
        anchor_offset: i64,
    ) -> Self {
        let benchmark_returns = simple_returns(benchmark_prices);
        let mut store = StockStore::from_records(records);

        let symbols: Vec<String> = store.symbols().map(str::to_string).collect();
        for symbol in symbols {
            if let Some(series) = prices.get(&symbol) {
                if let Err(e) = store.attach_market_data(&symbol, series.clone(), &benchmark_returns) {
                    warn!("Skipping {}: {}", symbol, e);
                }
            }
        }

        Self::new(store, anchor_offset)
    }

    /// Build from full dated histories, cutting an event window per stock and
    /// aligning the benchmark to each window's trading days.
    pub fn from_histories(
        records: impl IntoIterator<Item = EarningsRecord>,
        histories: &HashMap<String, PriceHistory>,
        benchmark: &PriceHistory,
        config: &WindowConfig,
    ) -> Self {
        let mut store = StockStore::from_records(records);
        let mut windows = Vec::new();

        for (_, stock) in store.iter() {
            let Some(history) = histories.get(stock.symbol()) else {
                warn!("No price history for {}", stock.symbol());
                continue;
            };
            match window::extract(history, benchmark, stock.earnings_date(), config) {
                Some(w) => windows.push((stock.symbol().to_string(), w)),
                None => warn!(
                    "Not enough price history around {} for {}",
                    stock.earnings_date(),
                    stock.symbol()
                ),
            }
        }

        for (symbol, w) in windows {
            let benchmark_returns = simple_returns(&w.benchmark_prices);
            if let Err(e) = store.attach_market_data(&symbol, w.prices, &benchmark_returns) {
                warn!("Skipping {}: {}", symbol, e);
            }
        }

        Self::new(store, config.anchor_offset())
    }

    pub fn store(&self) -> &StockStore {
        &self.store
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn anchor_offset(&self) -> i64 {
        self.anchor_offset
    }

    pub fn stock(&self, symbol: &str) -> Result<&Stock> {
        self.store
            .by_symbol(symbol)
            .ok_or_else(|| EventStudyError::UnknownSymbol(symbol.to_string()))
    }

    pub fn group(&self, kind: SurpriseGroup) -> &Group {
        self.groups.get(kind)
    }

    /// Point-estimate AAR/CAAR of one group.
    pub fn metrics(&self, kind: SurpriseGroup) -> GroupMetrics {
        self.groups.get(kind).metrics(&self.store)
    }

    /// Metrics of a group looked up by name; unknown names are rejected
    /// before anything is computed.
    pub fn metrics_by_name(&self, name: &str) -> Result<GroupMetrics> {
        Ok(self.groups.by_name(name)?.metrics(&self.store))
    }

    pub fn aar(&self, name: &str) -> Result<Vec<DayValue>> {
        Ok(self.metrics_by_name(name)?.aar_by_day(self.anchor_offset))
    }

    pub fn caar(&self, name: &str) -> Result<Vec<DayValue>> {
        Ok(self.metrics_by_name(name)?.caar_by_day(self.anchor_offset))
    }

    /// Point-estimate CAAR of all three groups.
    pub fn caar_table(&self) -> CaarTable {
        let [beat, meet, miss] = SurpriseGroup::ALL.map(|kind| self.metrics(kind).caar);
        CaarTable::from_curves(&beat, &meet, &miss, self.anchor_offset)
    }

    pub fn bootstrap(&self, config: BootstrapConfig) -> Result<BootstrapResult> {
        let engine = BootstrapEngine::new(config)?;
        Ok(engine.run(&self.store, &self.groups, self.anchor_offset))
    }

    pub fn bootstrap_with_rng<R: Rng + ?Sized>(
        &self,
        config: BootstrapConfig,
        rng: &mut R,
    ) -> Result<BootstrapResult> {
        let engine = BootstrapEngine::new(config)?;
        Ok(engine.run_with_rng(&self.store, &self.groups, self.anchor_offset, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;
    use chrono::{Duration, NaiveDate};

    fn date(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(offset)
    }

    fn records() -> Vec<EarningsRecord> {
        vec![
            EarningsRecord::new("BEAT", 1.0, 1.10, date(20)),
            EarningsRecord::new("MEET", 1.0, 1.02, date(20)),
            EarningsRecord::new("MISS", 1.0, 0.80, date(20)),
        ]
    }

    #[test]
    fn test_from_price_series_scenario() {
        let mut prices = HashMap::new();
        prices.insert("BEAT".to_string(), vec![100.0, 101.0, 102.0]);
        let study = EventStudy::from_price_series(records(), &prices, &[100.0, 101.0, 102.0], 0);

        let beat = study.metrics(SurpriseGroup::Beat);
        assert_eq!(beat.aar, vec![0.0, 0.0]);
        assert_eq!(beat.caar, vec![0.0, 0.0]);

        // No prices for MEET or MISS: they stay out of the groups.
        assert!(study.group(SurpriseGroup::Meet).is_empty());
        assert!(study.metrics(SurpriseGroup::Miss).is_empty());
    }

    #[test]
    fn test_unknown_group_and_symbol() {
        let study = EventStudy::from_price_series(records(), &HashMap::new(), &[], 30);

        assert!(matches!(study.aar("Inline"), Err(EventStudyError::UnknownGroup(_))));
        assert!(matches!(study.stock("GOOG"), Err(EventStudyError::UnknownSymbol(_))));
        assert!(study.stock("BEAT").is_ok());
        assert!(study.caar("Beat").unwrap().is_empty());
    }

    #[test]
    fn test_from_histories() {
        let make = |symbol: &str, step: f64| {
            let points = (0..40)
                .map(|d| PricePoint::new(date(d), 100.0 + step * d as f64))
                .collect();
            PriceHistory::new(symbol, points)
        };
        let mut histories = HashMap::new();
        histories.insert("BEAT".to_string(), make("BEAT", 1.0));
        histories.insert("MISS".to_string(), make("MISS", -1.0));
        let benchmark = make("SPY", 0.0);

        let study =
            EventStudy::from_histories(records(), &histories, &benchmark, &WindowConfig::new(5, 5));

        assert_eq!(study.anchor_offset(), 5);
        assert_eq!(study.stock("BEAT").unwrap().prices().len(), 11);
        assert_eq!(study.group(SurpriseGroup::Beat).len(), 1);
        assert!(study.group(SurpriseGroup::Meet).is_empty());

        let caar = study.caar("Beat").unwrap();
        assert_eq!(caar.len(), 10);
        assert_eq!(caar[0].day, -5);
        assert!(caar.iter().all(|p| p.value > 0.0));

        let table = study.caar_table();
        assert_eq!(table.len(), 10);
        assert!(table.rows()[0].meet.is_none());
        assert!(table.rows()[0].miss.unwrap() < 0.0);
    }

    #[test]
    fn test_benchmark_holiday_keeps_day_zero_on_announcement() {
        let points = |step: f64, skip: Option<i64>| -> Vec<PricePoint> {
            (0..40)
                .filter(|d| Some(*d) != skip)
                .map(|d| PricePoint::new(date(d), 100.0 + step * d as f64))
                .collect()
        };
        let mut histories = HashMap::new();
        histories.insert("BEAT".to_string(), PriceHistory::new("BEAT", points(1.0, None)));
        let benchmark = PriceHistory::new("SPY", points(0.0, Some(17)));
        let config = WindowConfig::new(5, 5);

        let study = EventStudy::from_histories(records(), &histories, &benchmark, &config);
        let prices = study.stock("BEAT").unwrap().prices();

        assert_eq!(prices.len(), config.span());
        assert_eq!(prices[config.anchor_offset() as usize], 120.0);
        assert_eq!(prices[0], 114.0);
    }

    #[test]
    fn test_bootstrap_rejects_bad_config() {
        let study = EventStudy::from_price_series(records(), &HashMap::new(), &[], 0);
        assert!(study.bootstrap(BootstrapConfig::new(0, 1)).is_err());
        assert!(study.bootstrap(BootstrapConfig::new(1, 1)).is_ok());
    }
}
