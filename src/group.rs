//! Surprise groups and cross-sectional AAR/CAAR aggregation.

use crate::error::Result;
use crate::stock::{StockId, StockStore};
use crate::types::{with_day_offsets, DayValue, SurpriseGroup};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Average abnormal return per day and its running cumulative sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMetrics {
    pub aar: Vec<f64>,
    pub caar: Vec<f64>,
}

impl GroupMetrics {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of event days covered.
    pub fn len(&self) -> usize {
        self.aar.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aar.is_empty()
    }

    pub fn aar_by_day(&self, anchor_offset: i64) -> Vec<DayValue> {
        with_day_offsets(&self.aar, anchor_offset)
    }

    pub fn caar_by_day(&self, anchor_offset: i64) -> Vec<DayValue> {
        with_day_offsets(&self.caar, anchor_offset)
    }
}

/// Aggregate abnormal-return series into AAR and CAAR.
///
/// Output length is the shortest member series (zero for no members), so
/// every reported day averages over the full membership. Member order fixes
/// the summation order, which keeps repeated calls bit-identical.
pub fn aggregate<'a, I>(series: I) -> GroupMetrics
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let series: Vec<&[f64]> = series.into_iter().collect();
    let Some(days) = series.iter().map(|s| s.len()).min() else {
        return GroupMetrics::empty();
    };

    let count = series.len() as f64;
    let aar: Vec<f64> = (0..days)
        .map(|day| series.iter().map(|s| s[day]).fold(0.0, |acc, x| acc + x) / count)
        .collect();
    let caar = cumulative_sum(&aar);

    GroupMetrics { aar, caar }
}

/// Running sum: `out[i] = values[0] + ... + values[i]`.
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// A named set of stock keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    kind: SurpriseGroup,
    members: Vec<StockId>,
}

impl Group {
    pub fn new(kind: SurpriseGroup) -> Self {
        Self {
            kind,
            members: Vec::new(),
        }
    }

    pub fn kind(&self) -> SurpriseGroup {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.label()
    }

    pub fn members(&self) -> &[StockId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// AAR/CAAR over the current members.
    pub fn metrics(&self, store: &StockStore) -> GroupMetrics {
        metrics_for(store, &self.members)
    }
}

/// AAR/CAAR over an arbitrary list of stock keys.
pub fn metrics_for(store: &StockStore, members: &[StockId]) -> GroupMetrics {
    aggregate(members.iter().map(|&id| store[id].abnormal_returns()))
}

/// The Beat, Meet and Miss groups of one study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSet {
    groups: [Group; 3],
}

impl GroupSet {
    /// Assign every stock with market data to its surprise group.
    ///
    /// Unlike a plain every-stock grouping, stocks without market data are
    /// left out of every group. A member with an empty abnormal-return series
    /// would cut the whole group's AAR/CAAR to zero days under the
    /// shortest-member rule.
    pub fn classify(store: &StockStore) -> Self {
        let mut groups = SurpriseGroup::ALL.map(Group::new);

        for (id, stock) in store.iter() {
            if !stock.has_market_data() {
                warn!("{} has no market data, excluding it from grouping", stock.symbol());
                continue;
            }
            groups[stock.group().index()].members.push(id);
        }

        for group in &groups {
            debug!("{} group: {} stocks", group.name(), group.len());
        }

        Self { groups }
    }

    pub fn get(&self, kind: SurpriseGroup) -> &Group {
        &self.groups[kind.index()]
    }

    /// Look a group up by name (`Beat`, `Meet` or `Miss`, case-insensitive).
    pub fn by_name(&self, name: &str) -> Result<&Group> {
        let kind: SurpriseGroup = name.parse()?;
        Ok(self.get(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Total number of grouped stocks.
    pub fn total(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventStudyError;
    use crate::types::EarningsRecord;
    use chrono::NaiveDate;

    fn store_with(entries: &[(&str, f64, f64, Option<Vec<f64>>)]) -> StockStore {
        let date = NaiveDate::from_ymd_opt(2024, 1, 25).unwrap();
        let mut store = StockStore::new();
        for (symbol, est, actual, prices) in entries {
            store.insert(EarningsRecord::new(*symbol, *est, *actual, date));
            if let Some(prices) = prices {
                let bench = vec![0.0; prices.len()];
                store
                    .attach_market_data(symbol, prices.clone(), &bench)
                    .unwrap();
            }
        }
        store
    }

    #[test]
    fn test_aggregate_empty() {
        let metrics = aggregate(std::iter::empty::<&[f64]>());
        assert!(metrics.is_empty());
        assert!(metrics.caar.is_empty());
    }

    #[test]
    fn test_single_member_matches_series() {
        let series = vec![0.01, -0.02, 0.005];
        let metrics = aggregate([series.as_slice()]);
        assert_eq!(metrics.aar, series);
        assert_eq!(metrics.caar, cumulative_sum(&series));
    }

    #[test]
    fn test_offsetting_members_cancel() {
        let a = [0.02];
        let b = [-0.02];
        let metrics = aggregate([&a[..], &b[..]]);
        assert_eq!(metrics.aar, vec![0.0]);
        assert_eq!(metrics.caar, vec![0.0]);
    }

    #[test]
    fn test_min_length_truncation() {
        let long = [0.01, 0.02, 0.03, 0.04];
        let short = [0.03, 0.00];
        let metrics = aggregate([&long[..], &short[..]]);

        assert_eq!(metrics.len(), 2);
        assert!((metrics.aar[0] - 0.02).abs() < 1e-12);
        assert!((metrics.aar[1] - 0.01).abs() < 1e-12);
        assert!((metrics.caar[1] - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_empty_member_empties_group() {
        let a = [0.01, 0.02];
        let metrics = aggregate([&a[..], &[][..]]);
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_non_finite_propagates() {
        let a = [f64::INFINITY, 0.01];
        let b = [0.0, 0.01];
        let metrics = aggregate([&a[..], &b[..]]);
        assert!(metrics.aar[0].is_infinite());
        assert!(metrics.caar[1].is_infinite());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let a = [0.1, 0.2, 0.3];
        let b = [0.7, -0.3, 0.11];
        let c = [1e-9, 3.3, -0.7];
        let first = aggregate([&a[..], &b[..], &c[..]]);
        let second = aggregate([&a[..], &b[..], &c[..]]);
        for (x, y) in first.caar.iter().zip(&second.caar) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_cumulative_sum() {
        assert_eq!(cumulative_sum(&[1.0, 2.0, 3.0]), vec![1.0, 3.0, 6.0]);
        assert!(cumulative_sum(&[]).is_empty());
    }

    #[test]
    fn test_classify_skips_stocks_without_data() {
        let store = store_with(&[
            ("AAA", 1.0, 1.2, Some(vec![10.0, 11.0])),
            ("BBB", 1.0, 1.0, Some(vec![10.0, 10.5])),
            ("CCC", 1.0, 0.5, Some(vec![10.0, 9.0])),
            ("DDD", 1.0, 1.3, None),
        ]);
        let groups = GroupSet::classify(&store);

        assert_eq!(groups.get(SurpriseGroup::Beat).len(), 1);
        assert_eq!(groups.get(SurpriseGroup::Meet).len(), 1);
        assert_eq!(groups.get(SurpriseGroup::Miss).len(), 1);
        assert_eq!(groups.total(), 3);
    }

    #[test]
    fn test_missing_data_does_not_shorten_group() {
        let store = store_with(&[
            ("AAA", 1.0, 1.2, Some(vec![10.0, 11.0, 12.1])),
            ("BBB", 1.0, 1.4, Some(vec![20.0, 21.0, 22.05])),
            ("DDD", 1.0, 1.3, None),
        ]);
        let groups = GroupSet::classify(&store);
        let beat = groups.get(SurpriseGroup::Beat);

        assert_eq!(beat.len(), 2);
        assert!(!beat.members().contains(&store.id_of("DDD").unwrap()));
        assert_eq!(beat.metrics(&store).len(), 2);
    }

    #[test]
    fn test_group_metrics_from_store() {
        let store = store_with(&[
            ("AAA", 1.0, 1.2, Some(vec![100.0, 102.0, 102.0])),
            ("BBB", 1.0, 1.5, Some(vec![100.0, 98.0, 98.0])),
        ]);
        let groups = GroupSet::classify(&store);
        let metrics = groups.get(SurpriseGroup::Beat).metrics(&store);

        assert_eq!(metrics.len(), 2);
        assert!(metrics.aar[0].abs() < 1e-12);
        assert!(metrics.caar[1].abs() < 1e-12);
    }

    #[test]
    fn test_by_name() {
        let groups = GroupSet::classify(&StockStore::new());
        assert_eq!(groups.by_name("beat").unwrap().kind(), SurpriseGroup::Beat);
        assert!(matches!(
            groups.by_name("Surprise"),
            Err(EventStudyError::UnknownGroup(_))
        ));
    }
}
