//! Discrete choice helpers shared by customers and owners.

use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// Preferences above this value are clamped before exponentiation.
pub const SOFTMAX_CLAMP: f64 = 20.0;

/// Softmax over preferences, clamping each preference to `SOFTMAX_CLAMP`
/// so that `exp` cannot overflow.
pub fn softmax(preferences: &[f64]) -> Vec<f64> {
    let exp: Vec<f64> = preferences.iter().map(|&p| p.min(SOFTMAX_CLAMP).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// Draw `n` independent categorical trials and return how often each
/// category was chosen. The result always sums to `n`.
///
/// Implemented as a chain of conditional binomials: category `i` receives
/// `Binomial(remaining, p_i / mass_of_categories_i_and_after)`.
pub fn multinomial<R: Rng + ?Sized>(rng: &mut R, n: u64, probabilities: &[f64]) -> Vec<u64> {
    let mut counts = vec![0u64; probabilities.len()];
    if probabilities.is_empty() {
        return counts;
    }
    let mut tail_mass: Vec<f64> = vec![0.0; probabilities.len()];
    let mut acc = 0.0;
    for i in (0..probabilities.len()).rev() {
        acc += probabilities[i].max(0.0);
        tail_mass[i] = acc;
    }

    let last = probabilities.len() - 1;
    let mut remaining = n;
    for i in 0..last {
        if remaining == 0 {
            break;
        }
        let mass = tail_mass[i];
        if mass <= 0.0 {
            break;
        }
        let p = (probabilities[i].max(0.0) / mass).clamp(0.0, 1.0);
        let drawn = match Binomial::new(remaining, p) {
            Ok(binomial) => binomial.sample(rng),
            Err(_) => 0,
        };
        counts[i] = drawn;
        remaining -= drawn;
    }
    if remaining > 0 {
        // Whatever is left goes to the last category that still carries mass.
        let target = (0..=last).rev().find(|&i| probabilities[i] > 0.0).unwrap_or(last);
        counts[target] += remaining;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rng::rng_from_seed;

    #[test]
    fn softmax_is_a_distribution() {
        let p = softmax(&[1.0, 2.0, -3.0, 0.5]);
        assert_eq!(p.len(), 4);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[1] > p[0] && p[0] > p[3] && p[3] > p[2]);
    }

    #[test]
    fn softmax_clamps_large_preferences() {
        let p = softmax(&[1e6, 20.0]);
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn multinomial_counts_sum_to_trials() {
        let mut rng = rng_from_seed(3);
        let probabilities = softmax(&[1.0, 0.3, 2.0, -1.0, 0.0]);
        for n in [0u64, 1, 7, 10, 1000] {
            let counts = multinomial(&mut rng, n, &probabilities);
            assert_eq!(counts.len(), probabilities.len());
            assert_eq!(counts.iter().sum::<u64>(), n);
        }
    }

    #[test]
    fn multinomial_respects_zero_probabilities() {
        let mut rng = rng_from_seed(11);
        let counts = multinomial(&mut rng, 500, &[0.0, 1.0, 0.0]);
        assert_eq!(counts, vec![0, 500, 0]);
        let counts = multinomial(&mut rng, 50, &[0.0, 0.0, 1.0]);
        assert_eq!(counts, vec![0, 0, 50]);
    }

    #[test]
    fn multinomial_frequencies_track_probabilities() {
        let mut rng = rng_from_seed(5);
        let counts = multinomial(&mut rng, 100_000, &[0.2, 0.5, 0.3]);
        assert!((counts[0] as f64 / 100_000.0 - 0.2).abs() < 0.01);
        assert!((counts[1] as f64 / 100_000.0 - 0.5).abs() < 0.01);
        assert!((counts[2] as f64 / 100_000.0 - 0.3).abs() < 0.01);
    }
}
