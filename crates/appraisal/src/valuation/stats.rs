use super::result::{MAX_CONFIDENCE, MIN_CONFIDENCE};

pub(crate) fn round_to_thousand(value: f64) -> f64 {
    (value / 1000.0).round() * 1000.0
}

pub(crate) fn clamp_confidence(raw: f64) -> u8 {
    let bounded = raw
        .round()
        .clamp(f64::from(MIN_CONFIDENCE), f64::from(MAX_CONFIDENCE));
    bounded as u8
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Weighted mean, or `None` when the weights sum to zero.
pub(crate) fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return None;
    }
    let weighted: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    Some(weighted / total_weight)
}

pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let center = mean(values);
    let variance =
        values.iter().map(|v| (v - center).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub(crate) fn weighted_std_dev(values: &[f64], weights: &[f64], center: f64) -> f64 {
    let total_weight: f64 = weights.iter().sum();
    if values.len() < 2 || total_weight <= 0.0 {
        return 0.0;
    }
    let variance = values
        .iter()
        .zip(weights)
        .map(|(v, w)| w * (v - center).powi(2))
        .sum::<f64>()
        / total_weight;
    variance.sqrt()
}

pub(crate) fn coefficient_of_variation(std_dev: f64, center: f64) -> f64 {
    if center.abs() <= f64::EPSILON {
        0.0
    } else {
        std_dev / center.abs()
    }
}

/// Confidence penalty shared by both sales comparison variants: sample size
/// first, then dispersion.
pub(crate) fn sample_and_spread_penalty(count: usize, cv: f64) -> f64 {
    let mut penalty = 0.0;
    if count < 3 {
        penalty += 15.0;
    }
    if count < 5 {
        penalty += 10.0;
    }
    if cv > 0.20 {
        penalty += 15.0;
    }
    if cv > 0.30 {
        penalty += 10.0;
    }
    penalty
}
