//! Core data types for the event-study engine.

use crate::error::EventStudyError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single earnings announcement as delivered by the record loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsRecord {
    pub symbol: String,
    pub eps_estimate: f64,
    pub actual_eps: f64,
    pub earnings_date: NaiveDate,
}

impl EarningsRecord {
    pub fn new(
        symbol: impl Into<String>,
        eps_estimate: f64,
        actual_eps: f64,
        earnings_date: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            eps_estimate,
            actual_eps,
            earnings_date,
        }
    }
}

/// Earnings-surprise bucket a stock is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SurpriseGroup {
    Beat,
    Meet,
    Miss,
}

impl SurpriseGroup {
    /// All groups in reporting order.
    pub const ALL: [SurpriseGroup; 3] = [SurpriseGroup::Beat, SurpriseGroup::Meet, SurpriseGroup::Miss];

    /// Display label, also the name accepted by [`FromStr`].
    pub fn label(&self) -> &'static str {
        match self {
            SurpriseGroup::Beat => "Beat",
            SurpriseGroup::Meet => "Meet",
            SurpriseGroup::Miss => "Miss",
        }
    }

    /// Position of the group inside [`SurpriseGroup::ALL`].
    pub fn index(self) -> usize {
        match self {
            SurpriseGroup::Beat => 0,
            SurpriseGroup::Meet => 1,
            SurpriseGroup::Miss => 2,
        }
    }
}

impl fmt::Display for SurpriseGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SurpriseGroup {
    type Err = EventStudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        SurpriseGroup::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(name))
            .ok_or_else(|| EventStudyError::UnknownGroup(s.to_string()))
    }
}

/// A metric value tagged with its event-relative day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayValue {
    pub day: i64,
    pub value: f64,
}

/// Label each entry with `index - anchor_offset`, so index `anchor_offset`
/// becomes day 0.
pub fn with_day_offsets(values: &[f64], anchor_offset: i64) -> Vec<DayValue> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| DayValue {
            day: i as i64 - anchor_offset,
            value,
        })
        .collect()
}

/// One row of a three-column CAAR table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaarRow {
    pub day: i64,
    pub beat: Option<f64>,
    pub meet: Option<f64>,
    pub miss: Option<f64>,
}

impl CaarRow {
    pub fn get(&self, group: SurpriseGroup) -> Option<f64> {
        match group {
            SurpriseGroup::Beat => self.beat,
            SurpriseGroup::Meet => self.meet,
            SurpriseGroup::Miss => self.miss,
        }
    }
}

/// Day-indexed Beat/Meet/Miss CAAR table for tabular export.
///
/// The table is as long as the longest column; shorter columns hold `None`
/// past their end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaarTable {
    anchor_offset: i64,
    rows: Vec<CaarRow>,
}

impl CaarTable {
    pub fn from_curves(beat: &[f64], meet: &[f64], miss: &[f64], anchor_offset: i64) -> Self {
        let days = beat.len().max(meet.len()).max(miss.len());
        let rows = (0..days)
            .map(|i| CaarRow {
                day: i as i64 - anchor_offset,
                beat: beat.get(i).copied(),
                meet: meet.get(i).copied(),
                miss: miss.get(i).copied(),
            })
            .collect();

        Self {
            anchor_offset,
            rows,
        }
    }

    pub fn rows(&self) -> &[CaarRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn anchor_offset(&self) -> i64 {
        self.anchor_offset
    }

    /// The populated cells of one column.
    pub fn column(&self, group: SurpriseGroup) -> Vec<DayValue> {
        self.rows
            .iter()
            .filter_map(|row| row.get(group).map(|value| DayValue { day: row.day, value }))
            .collect()
    }
}

/// Adjusted close on a given trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, adj_close: f64) -> Self {
        Self { date, adj_close }
    }
}

/// Chronological (earliest first) price history for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceHistory {
    /// Build a history from points in any order. Points are sorted by date;
    /// when a date repeats, the point supplied last wins.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self {
            symbol: symbol.into(),
            points: deduped,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Adjusted closes in chronological order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.adj_close).collect()
    }

    /// Adjusted close on an exact date.
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].adj_close)
    }

    /// Index of the first trading day on or after `date`.
    pub fn first_index_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.points.partition_point(|p| p.date < date);
        (idx < self.points.len()).then_some(idx)
    }
}
