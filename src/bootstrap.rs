//! Bootstrap resampling of group CAAR curves.
//!
//! Each iteration draws a subset of every surprise group, recomputes the
//! group's CAAR from that subset and records it in its own slot. Once all
//! iterations are collected, a separate reduction averages the curves per
//! group.
//!
//! # Example
//!
//! ```ignore
//! use earnings_event_study::bootstrap::{BootstrapConfig, BootstrapEngine};
//!
//! let study: EventStudy = /* from loaded data */;
//! let config = BootstrapConfig::default().with_sample_size(30).with_seed(7);
//! let engine = BootstrapEngine::new(config)?;
//!
//! let result = engine.run(study.store(), study.groups(), study.anchor_offset());
//! for point in result.curve_by_day(SurpriseGroup::Beat) {
//!     println!("{:>4} {:.4}%", point.day, point.value * 100.0);
//! }
//! ```

use crate::error::{EventStudyError, Result};
use crate::group::{metrics_for, GroupSet};
use crate::stock::{StockId, StockStore};
use crate::types::{with_day_offsets, CaarTable, DayValue, SurpriseGroup};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for a bootstrap run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Stocks drawn from each group per iteration.
    pub sample_size: usize,
    /// Number of resampling rounds.
    pub iterations: usize,
    /// Random seed for reproducibility (None for a fresh entropy seed).
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            sample_size: 40,
            iterations: 40,
            seed: None,
        }
    }
}

impl BootstrapConfig {
    pub fn new(sample_size: usize, iterations: usize) -> Self {
        Self {
            sample_size,
            iterations,
            seed: None,
        }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(EventStudyError::InvalidInput(
                "bootstrap sample size must be positive".to_string(),
            ));
        }
        if self.iterations == 0 {
            return Err(EventStudyError::InvalidInput(
                "bootstrap iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Averaged bootstrap CAAR curves for the three groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapResult {
    /// Configuration used.
    pub config: BootstrapConfig,
    /// Day index that maps to event day 0.
    pub anchor_offset: i64,
    curves: [Vec<f64>; 3],
}

impl BootstrapResult {
    /// Averaged CAAR for one group.
    pub fn curve(&self, group: SurpriseGroup) -> &[f64] {
        &self.curves[group.index()]
    }

    pub fn curve_by_day(&self, group: SurpriseGroup) -> Vec<DayValue> {
        with_day_offsets(self.curve(group), self.anchor_offset)
    }

    pub fn table(&self) -> CaarTable {
        CaarTable::from_curves(
            self.curve(SurpriseGroup::Beat),
            self.curve(SurpriseGroup::Meet),
            self.curve(SurpriseGroup::Miss),
            self.anchor_offset,
        )
    }
}

/// CAAR curves produced by a single iteration, one slot per group.
#[derive(Debug, Clone)]
struct IterationCurves([Vec<f64>; 3]);

impl IterationCurves {
    fn curve(&self, group: SurpriseGroup) -> &[f64] {
        &self.0[group.index()]
    }
}

/// Stateless bootstrap runner.
#[derive(Debug, Clone)]
pub struct BootstrapEngine {
    config: BootstrapConfig,
}

impl BootstrapEngine {
    /// Create an engine, rejecting non-positive sample sizes or iteration counts.
    pub fn new(config: BootstrapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Run with the configured seed, or an entropy seed when none is set.
    pub fn run(&self, store: &StockStore, groups: &GroupSet, anchor_offset: i64) -> BootstrapResult {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(store, groups, anchor_offset, &mut rng)
    }

    /// Run drawing all randomness from `rng`.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        store: &StockStore,
        groups: &GroupSet,
        anchor_offset: i64,
        rng: &mut R,
    ) -> BootstrapResult {
        let BootstrapConfig {
            sample_size,
            iterations,
            ..
        } = self.config;

        info!(
            "Bootstrapping {} iterations with sample size {}",
            iterations, sample_size
        );
        for group in groups.iter() {
            if group.len() < sample_size {
                warn!(
                    "{} group has only {} stocks; sampling the whole group instead of {}",
                    group.name(),
                    group.len(),
                    sample_size
                );
            }
        }

        let rounds: Vec<IterationCurves> = (0..iterations)
            .map(|i| {
                debug!("Bootstrap iteration {}/{}", i + 1, iterations);
                self.run_iteration(store, groups, rng)
            })
            .collect();

        let curves = SurpriseGroup::ALL.map(|group| {
            let per_round: Vec<&[f64]> = rounds.iter().map(|r| r.curve(group)).collect();
            average_curves(&per_round)
        });

        BootstrapResult {
            config: self.config.clone(),
            anchor_offset,
            curves,
        }
    }

    fn run_iteration<R: Rng + ?Sized>(
        &self,
        store: &StockStore,
        groups: &GroupSet,
        rng: &mut R,
    ) -> IterationCurves {
        IterationCurves(SurpriseGroup::ALL.map(|kind| {
            let sample = sample_members(groups.get(kind).members(), self.config.sample_size, rng);
            metrics_for(store, &sample).caar
        }))
    }
}

/// Draw `sample_size` distinct members uniformly without replacement.
///
/// When the population is not larger than `sample_size`, the whole population
/// is returned in its original order.
pub fn sample_members<R: Rng + ?Sized>(
    members: &[StockId],
    sample_size: usize,
    rng: &mut R,
) -> Vec<StockId> {
    if members.len() <= sample_size {
        return members.to_vec();
    }

    let mut pool = members.to_vec();
    pool.shuffle(rng);
    pool.truncate(sample_size);
    pool
}

/// Elementwise mean of curves over their common prefix.
///
/// The result is as long as the shortest curve; no curves gives an empty result.
pub fn average_curves<C: AsRef<[f64]>>(curves: &[C]) -> Vec<f64> {
    let Some(days) = curves.iter().map(|c| c.as_ref().len()).min() else {
        return Vec::new();
    };

    let count = curves.len() as f64;
    (0..days)
        .map(|day| {
            curves
                .iter()
                .map(|c| c.as_ref()[day])
                .fold(0.0, |acc, x| acc + x)
                / count
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EarningsRecord;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    /// Store with `beats` Beat stocks whose price series lengths cycle
    /// through `lengths`, plus one Meet and one Miss stock.
    fn sample_store(beats: usize, lengths: &[usize]) -> StockStore {
        let date = NaiveDate::from_ymd_opt(2024, 7, 30).unwrap();
        let mut store = StockStore::new();

        let add = |store: &mut StockStore, symbol: String, actual: f64, len: usize, drift: f64| {
            store.insert(EarningsRecord::new(symbol.clone(), 1.0, actual, date));
            let prices: Vec<f64> = (0..len).map(|d| 100.0 * (1.0 + drift).powi(d as i32)).collect();
            let bench = vec![0.0; len];
            store.attach_market_data(&symbol, prices, &bench).unwrap();
        };

        for i in 0..beats {
            let len = lengths[i % lengths.len()];
            add(&mut store, format!("B{i:03}"), 1.2, len, 0.001 * (i as f64 + 1.0));
        }
        add(&mut store, "MEET".to_string(), 1.0, 12, 0.0);
        add(&mut store, "MISS".to_string(), 0.5, 12, -0.01);
        store
    }

    #[test]
    fn test_config_validation() {
        assert!(BootstrapEngine::new(BootstrapConfig::new(0, 10)).is_err());
        assert!(BootstrapEngine::new(BootstrapConfig::new(10, 0)).is_err());
        assert!(BootstrapEngine::new(BootstrapConfig::new(1, 1)).is_ok());
    }

    #[test]
    fn test_sample_whole_population_when_small() {
        let members: Vec<StockId> = {
            let store = sample_store(4, &[10]);
            GroupSet::classify(&store)
                .get(SurpriseGroup::Beat)
                .members()
                .to_vec()
        };
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(sample_members(&members, 4, &mut rng), members);
        assert_eq!(sample_members(&members, 100, &mut rng), members);
    }

    #[test]
    fn test_sample_is_distinct_subset() {
        let store = sample_store(20, &[10]);
        let groups = GroupSet::classify(&store);
        let members = groups.get(SurpriseGroup::Beat).members();
        let population: HashSet<StockId> = members.iter().copied().collect();
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..50 {
            let sample = sample_members(members, 7, &mut rng);
            let unique: HashSet<StockId> = sample.iter().copied().collect();
            assert_eq!(sample.len(), 7);
            assert_eq!(unique.len(), 7);
            assert!(unique.is_subset(&population));
        }
    }

    #[test]
    fn test_single_full_iteration_matches_point_estimate() {
        let store = sample_store(5, &[10, 14, 12]);
        let groups = GroupSet::classify(&store);
        let engine = BootstrapEngine::new(BootstrapConfig::new(50, 1)).unwrap();

        let result = engine.run(&store, &groups, 5);

        for kind in SurpriseGroup::ALL {
            let point = groups.get(kind).metrics(&store);
            assert_eq!(result.curve(kind), point.caar.as_slice());
        }
    }

    #[test]
    fn test_full_population_is_deterministic_without_seed() {
        let store = sample_store(3, &[10]);
        let groups = GroupSet::classify(&store);
        let engine = BootstrapEngine::new(BootstrapConfig::new(3, 5)).unwrap();

        let a = engine.run(&store, &groups, 0);
        let b = engine.run(&store, &groups, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let store = sample_store(30, &[10, 16, 20]);
        let groups = GroupSet::classify(&store);
        let config = BootstrapConfig::new(5, 25).with_seed(12345);
        let engine = BootstrapEngine::new(config).unwrap();

        let first = engine.run(&store, &groups, 3);
        let second = engine.run(&store, &groups, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_injected_rng_reproduces() {
        let store = sample_store(30, &[10, 16, 20]);
        let groups = GroupSet::classify(&store);
        let engine = BootstrapEngine::new(BootstrapConfig::new(5, 10)).unwrap();

        let a = engine.run_with_rng(&store, &groups, 0, &mut StdRng::seed_from_u64(7));
        let b = engine.run_with_rng(&store, &groups, 0, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_ragged_iterations_use_shortest_curve() {
        // Price lengths 8 and 20 give abnormal-return lengths 7 and 19.
        let store = sample_store(10, &[8, 20]);
        let groups = GroupSet::classify(&store);
        let engine = BootstrapEngine::new(BootstrapConfig::new(1, 40).with_seed(3)).unwrap();

        let result = engine.run(&store, &groups, 0);
        let beat = result.curve(SurpriseGroup::Beat);

        // 40 single-stock draws from a 50/50 population all but surely include a short one.
        assert_eq!(beat.len(), 7);
        assert_eq!(result.curve(SurpriseGroup::Meet).len(), 11);
    }

    #[test]
    fn test_average_curves() {
        let curves = vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0], vec![2.0, 0.0, 9.0]];
        assert_eq!(average_curves(&curves), vec![2.0, 2.0]);
        assert!(average_curves::<Vec<f64>>(&[]).is_empty());
    }

    #[test]
    fn test_average_curves_order_invariant() {
        let curves = vec![vec![0.5, 0.25], vec![0.125, -0.75], vec![1.0, 0.0625]];
        let mut reversed = curves.clone();
        reversed.reverse();
        assert_eq!(average_curves(&curves), average_curves(&reversed));
    }

    #[test]
    fn test_result_table_and_offsets() {
        let store = sample_store(2, &[10]);
        let groups = GroupSet::classify(&store);
        let engine = BootstrapEngine::new(BootstrapConfig::new(2, 1)).unwrap();
        let result = engine.run(&store, &groups, 4);

        let by_day = result.curve_by_day(SurpriseGroup::Beat);
        assert_eq!(by_day.first().unwrap().day, -4);
        assert_eq!(result.table().len(), 11);
        assert_eq!(result.table().rows()[4].day, 0);
    }
}
