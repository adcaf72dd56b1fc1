//! Selection operators.
//!
//! Both operators sample without replacement and refuse to return fewer
//! candidates than requested.

// Selection uses intentional casts for statistics
#![allow(clippy::cast_precision_loss)]

use crate::error::SelectionError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How [`crate::Population::pick`] samples agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Every remaining agent is equally likely.
    #[default]
    Uniform,
    /// Fitness-proportionate ("roulette wheel").
    RouletteWheel,
}

/// Pick `n` distinct indices out of `0..len` uniformly.
///
/// # Errors
///
/// Returns [`SelectionError::NotEnoughCandidates`] if `n > len`.
pub fn uniform<R: Rng>(len: usize, n: usize, rng: &mut R) -> Result<Vec<usize>, SelectionError> {
    if n > len {
        return Err(SelectionError::NotEnoughCandidates {
            requested: n,
            available: len,
        });
    }
    Ok(rand::seq::index::sample(rng, len, n).into_vec())
}

/// Pick `n` distinct indices with probability proportional to `weights`.
///
/// Each round draws `r` uniformly in `[0, total)` and walks the remaining
/// candidates subtracting their weights until `r` is no longer positive; the
/// candidate reached is removed from the wheel. Negative and non-finite
/// weights count as zero, and a wheel of zero total weight yields candidates
/// in order.
///
/// # Errors
///
/// Returns [`SelectionError::NotEnoughCandidates`] if `n > weights.len()`.
pub fn roulette_wheel<R: Rng>(
    weights: &[f64],
    n: usize,
    rng: &mut R,
) -> Result<Vec<usize>, SelectionError> {
    if n > weights.len() {
        return Err(SelectionError::NotEnoughCandidates {
            requested: n,
            available: weights.len(),
        });
    }

    let mut available: Vec<(usize, f64)> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .enumerate()
        .collect();
    let mut total: f64 = available.iter().map(|&(_, w)| w).sum();
    let mut picked = Vec::with_capacity(n);

    while picked.len() < n {
        let mut r = rng.r#gen::<f64>() * total;
        // rounding can leave r a hair above zero after the last candidate
        let mut chosen = available.len() - 1;
        for (k, &(_, w)) in available.iter().enumerate() {
            r -= w;
            if r <= 0.0 {
                chosen = k;
                break;
            }
        }
        let (index, w) = available.remove(chosen);
        total = (total - w).max(0.0);
        picked.push(index);
    }

    Ok(picked)
}

/// Summary statistics over a set of fitness values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitnessStats {
    /// Mean fitness.
    pub mean_fitness: f64,
    /// Best fitness.
    pub best_fitness: f64,
    /// Worst fitness.
    pub worst_fitness: f64,
    /// Standard deviation of fitness.
    pub fitness_std: f64,
}

impl FitnessStats {
    /// Calculate statistics from fitness values.
    #[must_use]
    pub fn from_fitness(fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                mean_fitness: 0.0,
                best_fitness: 0.0,
                worst_fitness: 0.0,
                fitness_std: 0.0,
            };
        }

        let mean = fitness.iter().sum::<f64>() / fitness.len() as f64;
        let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = fitness.iter().copied().fold(f64::INFINITY, f64::min);
        let variance = fitness.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / fitness.len() as f64;

        Self {
            mean_fitness: mean,
            best_fitness: best,
            worst_fitness: worst,
            fitness_std: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_roulette_wheel_chi_square() {
        let mut rng = SmallRng::seed_from_u64(42);
        let weights: Vec<f64> = (1..=10).map(f64::from).collect();
        let total: f64 = weights.iter().sum();
        let n = 10_000;

        let mut observed = [0usize; 10];
        for _ in 0..n {
            let pick = roulette_wheel(&weights, 1, &mut rng).unwrap();
            observed[pick[0]] += 1;
        }

        let chi_square: f64 = weights
            .iter()
            .zip(observed)
            .map(|(w, o)| {
                let expected = w / total * f64::from(n);
                (o as f64 - expected).powi(2) / expected
            })
            .sum();
        // χ²(0.99, 9 degrees of freedom)
        assert!(chi_square < 21.666, "chi square {chi_square}");
    }

    #[test]
    fn test_roulette_wheel_without_replacement() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let mut picked = roulette_wheel(&[1.0, 5.0, 0.5, 2.0], 4, &mut rng).unwrap();
            picked.sort_unstable();
            assert_eq!(picked, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_roulette_wheel_skips_zero_weights() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..200 {
            let picked = roulette_wheel(&[0.0, 1.0, 0.0, -4.0], 1, &mut rng).unwrap();
            assert_eq!(picked, vec![1]);
        }
    }

    #[test]
    fn test_roulette_wheel_all_zero() {
        let mut rng = SmallRng::seed_from_u64(3);
        let picked = roulette_wheel(&[0.0, 0.0, 0.0], 2, &mut rng).unwrap();
        assert_eq!(picked, vec![0, 1]);
    }

    #[test]
    fn test_not_enough_candidates() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            roulette_wheel(&[1.0], 2, &mut rng),
            Err(SelectionError::NotEnoughCandidates {
                requested: 2,
                available: 1
            })
        );
        assert!(uniform(3, 4, &mut rng).is_err());
    }

    #[test]
    fn test_uniform_distinct() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut picked = uniform(10, 10, &mut rng).unwrap();
        picked.sort_unstable();
        assert_eq!(picked, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_fitness_stats() {
        let stats = FitnessStats::from_fitness(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((stats.mean_fitness - 3.0).abs() < 0.001);
        assert!((stats.best_fitness - 5.0).abs() < 0.001);
        assert!((stats.worst_fitness - 1.0).abs() < 0.001);
    }
}
