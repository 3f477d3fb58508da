//! Earnings Event Study - abnormal-return analytics around earnings announcements.
//!
//! # Overview
//!
//! Stocks are classified by earnings surprise into Beat, Meet and Miss groups,
//! and their behaviour around the announcement is measured against a market
//! benchmark:
//!
//! - **Returns**: simple daily returns from adjusted closes
//! - **Abnormal returns**: stock return minus benchmark return, day by day
//! - **Classification**: surprise above +5% beats, below -5% misses
//! - **AAR / CAAR**: cross-sectional average abnormal return and its running sum
//! - **Bootstrap**: repeated subsampling of each group to test CAAR stability
//!
//! # Quick Start
//!
//! ```
//! use earnings_event_study::{EarningsRecord, EventStudy, SurpriseGroup};
//! use chrono::NaiveDate;
//! use std::collections::HashMap;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
//! let records = vec![EarningsRecord::new("AAPL", 1.50, 1.65, date)];
//!
//! let mut prices = HashMap::new();
//! prices.insert("AAPL".to_string(), vec![100.0, 103.0, 104.0]);
//! let benchmark = vec![400.0, 404.0, 402.0];
//!
//! let study = EventStudy::from_price_series(records, &prices, &benchmark, 1);
//! let caar = study.caar("Beat").unwrap();
//! assert_eq!(caar.len(), 2);
//! assert_eq!(caar[0].day, -1);
//! assert_eq!(study.group(SurpriseGroup::Beat).len(), 1);
//! ```
//!
//! # Modules
//!
//! - [`types`]: Core data types (records, groups, price histories, tables)
//! - [`returns`]: Return and abnormal-return series
//! - [`classify`]: Earnings-surprise classification
//! - [`stock`]: Stock records and the arena that owns them
//! - [`group`]: Group membership and AAR/CAAR aggregation
//! - [`bootstrap`]: Bootstrap resampling of group CAAR
//! - [`window`]: Event windows and benchmark alignment
//! - [`study`]: The [`EventStudy`] facade
//! - [`data`]: CSV loaders for earnings records and prices
//! - [`config`]: TOML configuration file support
//! - [`export`]: CSV and JSON export
//! - [`report`]: Terminal rendering

pub mod bootstrap;
pub mod classify;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod group;
pub mod report;
pub mod returns;
pub mod stock;
pub mod study;
pub mod types;
pub mod window;

// Re-exports for convenience
pub use bootstrap::{average_curves, sample_members, BootstrapConfig, BootstrapEngine, BootstrapResult};
pub use classify::{classify, classify_surprise, surprise_pct, SURPRISE_THRESHOLD_PCT};
pub use config::StudyFileConfig;
pub use error::{EventStudyError, Result};
pub use group::{aggregate, cumulative_sum, Group, GroupMetrics, GroupSet};
pub use returns::{abnormal_returns, simple_returns};
pub use stock::{Stock, StockId, StockStore};
pub use study::EventStudy;
pub use types::{
    with_day_offsets, CaarRow, CaarTable, DayValue, EarningsRecord, PriceHistory, PricePoint,
    SurpriseGroup,
};
pub use window::{EventWindow, WindowConfig};
