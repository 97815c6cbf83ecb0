//! Fitness shaping for the external search process.
//!
//! The search is a minimizer: a confirmed novel discrepancy gets the
//! global minimum immediately, everything else gets a smooth score
//! that is lowest when the candidate's shape metrics sit near the
//! configured targets.

use crate::domain::Verdict;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FitnessConfig {
    #[serde(default = "default_base")]
    pub base: f64,
    #[serde(rename = "lengthWeight", default = "default_weight")]
    pub length_weight: f64,
    #[serde(rename = "distinctWeight", default = "default_weight")]
    pub distinct_weight: f64,
    #[serde(rename = "targetLength", default = "default_target_length")]
    pub target_length: f64,
    #[serde(rename = "targetDistinct", default = "default_target_distinct")]
    pub target_distinct: f64,
    /// Weight on `|distinct - previous generation average|`; zero
    /// disables the population-relative diversity term.
    #[serde(rename = "diversityWeight", default)]
    pub diversity_weight: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            length_weight: default_weight(),
            distinct_weight: default_weight(),
            target_length: default_target_length(),
            target_distinct: default_target_distinct(),
            diversity_weight: 0.0,
        }
    }
}

fn default_base() -> f64 {
    30.0
}

fn default_weight() -> f64 {
    10.0
}

fn default_target_length() -> f64 {
    300.0
}

fn default_target_distinct() -> f64 {
    15.0
}

#[derive(Debug, Default)]
struct GenerationState {
    generation: Option<u64>,
    running_sum: f64,
    previous_sum: f64,
}

/// Running distinct-token totals keyed by the externally supplied
/// generation identifier. Shared across every evaluation in a
/// generation; read-modify-write is atomic under one lock.
#[derive(Debug, Default)]
pub struct GenerationStats {
    state: Mutex<GenerationState>,
}

impl GenerationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rolls the stats forward to `generation` if it changed, adds
    /// `distinct_token_count` to the running sum, and returns the
    /// previous generation's average over `population_size`.
    pub fn observe(
        &self,
        generation: u64,
        distinct_token_count: usize,
        population_size: usize,
    ) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation != Some(generation) {
            state.previous_sum = state.running_sum;
            state.running_sum = 0.0;
            state.generation = Some(generation);
        }
        let previous_average = if population_size > 0 {
            state.previous_sum / population_size as f64
        } else {
            0.0
        };
        state.running_sum += distinct_token_count as f64;
        previous_average
    }
}

#[derive(Debug, Default)]
pub struct FitnessShaper {
    config: FitnessConfig,
    stats: Arc<GenerationStats>,
}

impl FitnessShaper {
    pub fn new(config: FitnessConfig) -> Self {
        Self::with_stats(config, Arc::new(GenerationStats::new()))
    }

    /// Builds a shaper sharing `stats` with other pipeline instances,
    /// so parallel workers accumulate one generation sum instead of
    /// each seeing only its own slice of the population.
    pub fn with_stats(config: FitnessConfig, stats: Arc<GenerationStats>) -> Self {
        Self { config, stats }
    }

    pub fn stats(&self) -> &Arc<GenerationStats> {
        &self.stats
    }

    /// Converts one evaluation into the scalar the search consumes.
    /// Returns `(score, novel_bug)`; lower scores are better and a
    /// novel verdict short-circuits to the global minimum of zero.
    pub fn shape(
        &self,
        token_count: usize,
        distinct_token_count: usize,
        verdict: Verdict,
        generation: u64,
        population_size: usize,
    ) -> (f64, bool) {
        if verdict.is_novel() {
            return (0.0, true);
        }

        let previous_average =
            self.stats
                .observe(generation, distinct_token_count, population_size);

        let length_delta = token_count as f64 - self.config.target_length;
        let distinct_delta = distinct_token_count as f64 - self.config.target_distinct;
        let mut score = self.config.base
            - self.config.length_weight * (-(length_delta * length_delta)).exp()
            - self.config.distinct_weight * (-(distinct_delta * distinct_delta)).exp();
        if self.config.diversity_weight != 0.0 {
            score += self.config.diversity_weight
                * (distinct_token_count as f64 - previous_average).abs();
        }
        (score, false)
    }
}

#[cfg(test)]
mod tests {
    use super::{FitnessConfig, FitnessShaper, GenerationStats};
    use crate::domain::Verdict;
    use std::sync::Arc;

    #[test]
    fn novel_verdicts_take_the_global_minimum() {
        let shaper = FitnessShaper::new(FitnessConfig::default());
        assert_eq!(shaper.shape(3, 3, Verdict::Ice, 0, 10), (0.0, true));
        assert_eq!(
            shaper.shape(500, 80, Verdict::SuccessMismatch, 0, 10),
            (0.0, true)
        );
    }

    #[test]
    fn score_bottoms_out_at_the_shape_targets() {
        let config = FitnessConfig {
            target_length: 300.0,
            target_distinct: 15.0,
            ..FitnessConfig::default()
        };
        let shaper = FitnessShaper::new(config);
        let (on_target, novel) = shaper.shape(300, 15, Verdict::Same, 0, 10);
        assert!(!novel);
        assert!((on_target - (config.base - config.length_weight - config.distinct_weight)).abs() < 1e-9);

        let (off_target, _) = shaper.shape(3, 3, Verdict::Same, 0, 10);
        assert!(off_target > on_target);
        assert!((off_target - config.base).abs() < 1e-6);
    }

    #[test]
    fn suppressed_known_bugs_are_scored_like_non_findings() {
        let shaper = FitnessShaper::new(FitnessConfig::default());
        let (score, novel) = shaper.shape(300, 15, Verdict::KnownBugSuppressed, 0, 10);
        assert!(!novel);
        assert!(score > 0.0);
    }

    #[test]
    fn generation_rollover_snapshots_the_running_sum() {
        let stats = GenerationStats::new();
        // Generation 0: three candidates contribute 4 + 6 + 10 = 20.
        assert_eq!(stats.observe(0, 4, 4), 0.0);
        assert_eq!(stats.observe(0, 6, 4), 0.0);
        assert_eq!(stats.observe(0, 10, 4), 0.0);
        // First observation of generation 1 sees 20 / 4.
        assert_eq!(stats.observe(1, 2, 4), 5.0);
        // Still generation 1: reference average is unchanged.
        assert_eq!(stats.observe(1, 2, 4), 5.0);
        // Generation 2 snapshots 2 + 2 = 4.
        assert_eq!(stats.observe(2, 1, 4), 1.0);
    }

    #[test]
    fn zero_population_never_divides() {
        let stats = GenerationStats::new();
        stats.observe(0, 9, 0);
        assert_eq!(stats.observe(1, 1, 0), 0.0);
    }

    #[test]
    fn workers_sharing_stats_agree_on_the_population_average() {
        let config = FitnessConfig {
            diversity_weight: 1.0,
            ..FitnessConfig::default()
        };
        let stats = Arc::new(GenerationStats::new());
        let first_worker = FitnessShaper::with_stats(config, Arc::clone(&stats));
        let second_worker = FitnessShaper::with_stats(config, Arc::clone(&stats));

        // Generation 0 is split across the workers: 10 + 30 over a
        // population of 2, so the shared average is 20.
        first_worker.shape(50, 10, Verdict::Same, 0, 2);
        second_worker.shape(50, 30, Verdict::Same, 0, 2);

        // Identical generation-1 candidates must score identically on
        // either worker; per-worker stats would see averages of 5 and
        // 15 instead and pull the scores apart.
        let (from_first, _) = first_worker.shape(50, 20, Verdict::Same, 1, 2);
        let (from_second, _) = second_worker.shape(50, 20, Verdict::Same, 1, 2);
        assert_eq!(from_first, from_second);
        assert!((from_first - 30.0).abs() < 1e-6);
    }

    #[test]
    fn diversity_term_penalizes_distance_from_the_population_average() {
        let config = FitnessConfig {
            diversity_weight: 1.0,
            ..FitnessConfig::default()
        };
        let shaper = FitnessShaper::new(config);
        // Seed generation 0 with an average of 10 over population 1.
        shaper.shape(50, 10, Verdict::Same, 0, 1);
        let (near, _) = shaper.shape(50, 10, Verdict::Same, 1, 1);
        let (far, _) = shaper.shape(50, 40, Verdict::Same, 1, 1);
        assert!(far > near);
    }
}
