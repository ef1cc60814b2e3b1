//! Customer purchase models.
//!
//! A customer turns the current offers into a probability distribution over
//! purchase decisions. Circular markets use the layout
//! `[nothing, refurbished_0, new_0, refurbished_1, new_1, ...]`, linear markets
//! `[nothing, vendor_0, vendor_1, ...]`. Prices are shifted by one before use.

use std::f64::consts::PI;

use crate::market::config::Config;
use crate::market::state::MarketState;
use crate::utils::stats::softmax;

const NOTHING_PREFERENCE: f64 = 1.0;

/// Amplitude and period of the optional seasonal demand term.
const SEASON_AMPLITUDE: f64 = 7.0;
const SEASON_PERIOD: f64 = 200.0;

pub trait Customer {
    fn purchase_probabilities(&self, config: &Config, state: &MarketState) -> Vec<f64>;
}

/// Softmax customer of circular economies. Values a refurbished product at
/// `compared_value_old` of a new one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CircularCustomer;

impl Customer for CircularCustomer {
    fn purchase_probabilities(&self, config: &Config, state: &MarketState) -> Vec<f64> {
        let mut preferences = Vec::with_capacity(1 + 2 * state.actions.len());
        preferences.push(NOTHING_PREFERENCE);
        for action in &state.actions {
            let refurbished = f64::from(action.price_refurbished()) + 1.0;
            let new = f64::from(action.price_new()) + 1.0;
            preferences.push(config.compared_value_old * 10.0 / refurbished - (refurbished - config.upper_tolerance_old).exp());
            preferences.push(10.0 / new - (new - config.upper_tolerance_new).exp());
        }
        softmax(&preferences)
    }
}

/// Softmax customer of linear economies.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearCustomer;

impl LinearCustomer {
    /// Seasonal demand shift at `step`, zero unless enabled in the config.
    pub fn seasonal_component(config: &Config, step: u32) -> f64 {
        if config.seasonal_customers {
            SEASON_AMPLITUDE * (f64::from(step) * 2.0 * PI / SEASON_PERIOD).sin()
        } else {
            0.0
        }
    }
}

impl Customer for LinearCustomer {
    fn purchase_probabilities(&self, config: &Config, state: &MarketState) -> Vec<f64> {
        let season = Self::seasonal_component(config, state.step_counter);
        let mut preferences = Vec::with_capacity(1 + state.actions.len());
        preferences.push(NOTHING_PREFERENCE);
        for action in &state.actions {
            let price = f64::from(action.price()) + 1.0;
            preferences.push(10.0 / price - (price - 8.0).exp() + season);
        }
        softmax(&preferences)
    }
}

#[cfg(feature = "nalgebra")]
pub use learned::LearnedCustomer;

#[cfg(feature = "nalgebra")]
mod learned {
    use nalgebra::DMatrix;

    use super::Customer;
    use crate::core::{MarketError, Result};
    use crate::market::config::Config;
    use crate::market::state::MarketState;

    /// Customer fitted by least squares on recorded `(prices, choice
    /// frequencies)` pairs. Predictions are clipped at zero and normalized.
    #[derive(Clone, Debug, PartialEq)]
    pub struct LearnedCustomer {
        /// `(1 + number of prices) x outcomes`, first row is the intercept.
        coefficients: DMatrix<f64>,
    }

    impl LearnedCustomer {
        pub fn fit(prices: &[Vec<f64>], frequencies: &[Vec<f64>]) -> Result<Self> {
            let rows = prices.len();
            if rows == 0 || rows != frequencies.len() {
                return Err(MarketError::Input(format!(
                    "need matching, non-empty samples, got {} price rows and {} frequency rows",
                    rows,
                    frequencies.len()
                )));
            }
            let features = prices[0].len() + 1;
            let outcomes = frequencies[0].len();
            if prices.iter().any(|p| p.len() + 1 != features) || frequencies.iter().any(|f| f.len() != outcomes) {
                return Err(MarketError::Input("samples differ in length".into()));
            }

            let x = DMatrix::from_fn(rows, features, |r, c| if c == 0 { 1.0 } else { prices[r][c - 1] });
            let y = DMatrix::from_fn(rows, outcomes, |r, c| frequencies[r][c]);
            let coefficients = x
                .svd(true, true)
                .solve(&y, 1e-12)
                .map_err(|e| MarketError::Input(format!("least squares failed: {e}")))?;
            Ok(Self { coefficients })
        }

        pub fn outcomes(&self) -> usize { self.coefficients.ncols() }

        /// Distribution predicted for a flat price vector.
        pub fn predict(&self, prices: &[f64]) -> Vec<f64> {
            let mut raw = self.coefficients.row(0).clone_owned();
            for (i, price) in prices.iter().enumerate().take(self.coefficients.nrows() - 1) {
                raw += self.coefficients.row(i + 1) * *price;
            }
            let clipped: Vec<f64> = raw.iter().map(|v| v.max(0.0)).collect();
            let total: f64 = clipped.iter().sum();
            if total > 0.0 {
                clipped.into_iter().map(|v| v / total).collect()
            } else {
                vec![1.0 / clipped.len() as f64; clipped.len()]
            }
        }
    }

    impl Customer for LearnedCustomer {
        fn purchase_probabilities(&self, _config: &Config, state: &MarketState) -> Vec<f64> {
            let prices: Vec<f64> = state
                .actions
                .iter()
                .flat_map(|a| a.prices().iter().map(|&p| f64::from(p)))
                .collect();
            self.predict(&prices)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::action::Action;
    use crate::market::state::VendorState;

    fn state(actions: Vec<Action>) -> MarketState {
        MarketState {
            step_counter: 0,
            in_circulation: 0,
            vendors: vec![VendorState::default(); actions.len()],
            actions,
        }
    }

    #[test]
    fn circular_distribution_has_two_slots_per_vendor() {
        let config = Config::default();
        let probs = CircularCustomer.purchase_probabilities(&config, &state(vec![Action::from((3, 6)), Action::from((4, 5))]));
        assert_eq!(probs.len(), 5);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|&p| p > 0.0));
    }

    #[test]
    fn circular_preferences_follow_the_ratio_formula() {
        let config = Config::default();
        let probs = CircularCustomer.purchase_probabilities(&config, &state(vec![Action::from((4, 6))]));
        let refurbished: f64 = 5.5 / 5.0 - (5.0f64 - 5.0).exp();
        let new: f64 = 10.0 / 7.0 - (7.0f64 - 8.0).exp();
        let expected = softmax(&[1.0, refurbished, new]);
        for (p, e) in probs.iter().zip(expected) {
            assert!((p - e).abs() < 1e-12);
        }
    }

    #[test]
    fn cheaper_offers_are_preferred() {
        let config = Config::default();
        let probs = LinearCustomer.purchase_probabilities(&config, &state(vec![Action::from(2), Action::from(8)]));
        assert_eq!(probs.len(), 3);
        assert!(probs[1] > probs[2]);
    }

    #[test]
    fn seasonal_term_is_off_by_default() {
        let config = Config::default();
        assert_eq!(LinearCustomer::seasonal_component(&config, 50), 0.0);
        let seasonal = Config { seasonal_customers: true, ..Config::default() };
        assert!((LinearCustomer::seasonal_component(&seasonal, 50) - 7.0).abs() < 1e-9);
    }

    #[cfg(feature = "nalgebra")]
    #[test]
    fn learned_customer_recovers_a_linear_rule() {
        let prices: Vec<Vec<f64>> = (0..10).map(|p| vec![p as f64]).collect();
        let frequencies: Vec<Vec<f64>> = prices.iter().map(|p| vec![p[0], 10.0 - p[0]]).collect();
        let customer = LearnedCustomer::fit(&prices, &frequencies).expect("well-posed fit");
        let predicted = customer.predict(&[2.0]);
        assert!((predicted[0] - 0.2).abs() < 1e-6);
        assert!((predicted[1] - 0.8).abs() < 1e-6);
        assert!(LearnedCustomer::fit(&prices, &frequencies[..3]).is_err());
    }
}
