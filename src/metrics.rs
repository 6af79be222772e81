//! Prediction accuracy estimate
//!
//! A synthetic figure, not a fitted model: finishing positions are perturbed
//! with seeded normal noise whose spread grows with rain and with how close
//! the podium scores are, and the resulting error is turned into MSE, RMSE
//! and a confidence percentage. The fixed seed makes repeated runs identical.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::models::{AccuracyEstimate, PodiumEntry};

/// Position standard deviation before weather and spread adjustments
pub const BASE_VARIANCE: f64 = 1.2;

/// Seed for the position error simulation
pub const SIMULATION_SEED: u64 = 42;

const MIN_POSITION: f64 = 1.0;
const MAX_POSITION: f64 = 20.0;

/// Spread (max - min) of the podium scores
pub fn score_spread(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// `1.2 * (1 + 0.5R) * (1 + (0.5 - min(0.5, spread)))`
pub fn adjusted_variance(rain_probability: f64, spread: f64) -> f64 {
    let weather_uncertainty = 1.0 + rain_probability * 0.5;
    BASE_VARIANCE * weather_uncertainty * (1.0 + (0.5 - spread.min(0.5)))
}

/// Mean squared difference between two position lists
pub fn mean_squared_error(predicted: &[f64], simulated: &[f64]) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    let total: f64 = predicted
        .iter()
        .zip(simulated)
        .map(|(p, s)| (p - s).powi(2))
        .sum();
    total / predicted.len() as f64
}

/// `100 - 25 * RMSE - 10 * R`, reported unclamped
pub fn confidence(rmse: f64, rain_probability: f64) -> f64 {
    100.0 - rmse * 25.0 - rain_probability * 10.0
}

/// Simulate position errors for the podium and summarize them
pub fn estimate_accuracy(podium: &[PodiumEntry], rain_probability: f64) -> AccuracyEstimate {
    let scores: Vec<f64> = podium.iter().map(|e| e.score).collect();
    let std_dev = adjusted_variance(rain_probability, score_spread(&scores));

    let predicted: Vec<f64> = podium
        .iter()
        .map(|e| f64::from(e.predicted_position))
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(SIMULATION_SEED);
    let simulated_positions: Vec<f64> = match Normal::new(0.0, std_dev) {
        Ok(noise) => predicted
            .iter()
            .map(|p| (p + noise.sample(&mut rng)).clamp(MIN_POSITION, MAX_POSITION))
            .collect(),
        // Unreachable for rain in [0, 1]; treat the prediction as exact
        Err(_) => predicted.clone(),
    };

    let mse = mean_squared_error(&predicted, &simulated_positions);
    let rmse = mse.sqrt();

    AccuracyEstimate {
        mse,
        rmse,
        confidence: confidence(rmse, rain_probability),
        std_dev,
        simulated_positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DriverIdentity, DriverWeekendRecord};

    fn entry(position: u32, score: f64) -> PodiumEntry {
        PodiumEntry {
            predicted_position: position,
            position_change: 0,
            score,
            record: DriverWeekendRecord::new(
                DriverIdentity {
                    name: format!("Driver {position}"),
                    code: None,
                },
                "Unknown".to_string(),
                position,
            ),
        }
    }

    #[test]
    fn test_adjusted_variance() {
        // Tight scores, dry: 1.2 * 1.0 * 1.5
        assert!((adjusted_variance(0.0, 0.0) - 1.8).abs() < 1e-12);
        // Wide spread saturates at 0.5
        assert!((adjusted_variance(0.0, 0.9) - 1.2).abs() < 1e-12);
        // Full rain: 1.2 * 1.5 * 1.25
        assert!((adjusted_variance(1.0, 0.25) - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_score_spread() {
        assert!((score_spread(&[0.9, 0.7, 0.8]) - 0.2).abs() < 1e-12);
        assert_eq!(score_spread(&[]), 0.0);
    }

    #[test]
    fn test_mean_squared_error() {
        assert!((mean_squared_error(&[1.0, 2.0, 3.0], &[2.0, 2.0, 1.0]) - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(mean_squared_error(&[], &[]), 0.0);
    }

    #[test]
    fn test_confidence_is_unclamped() {
        assert!((confidence(0.0, 0.0) - 100.0).abs() < 1e-12);
        assert!((confidence(1.0, 0.5) - 70.0).abs() < 1e-12);
        assert!(confidence(5.0, 1.0) < 0.0);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let podium = vec![entry(1, 0.92), entry(2, 0.90), entry(3, 0.85)];
        let first = estimate_accuracy(&podium, 0.3);
        let second = estimate_accuracy(&podium, 0.3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_estimate_is_consistent() {
        let podium = vec![entry(1, 0.92), entry(2, 0.90), entry(3, 0.85)];
        let estimate = estimate_accuracy(&podium, 0.0);

        assert_eq!(estimate.simulated_positions.len(), 3);
        assert!(estimate
            .simulated_positions
            .iter()
            .all(|p| (1.0..=20.0).contains(p)));
        assert!((estimate.rmse - estimate.mse.sqrt()).abs() < 1e-12);
        assert!((estimate.confidence - (100.0 - 25.0 * estimate.rmse)).abs() < 1e-9);
        assert!((estimate.std_dev - adjusted_variance(0.0, 0.07)).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_empty_podium() {
        let estimate = estimate_accuracy(&[], 0.0);
        assert_eq!(estimate.mse, 0.0);
        assert!((estimate.confidence - 100.0).abs() < 1e-12);
    }
}
