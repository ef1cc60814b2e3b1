//! Owner return models of circular economies.
//!
//! Every distribution has the layout `[hold, discard, return_0, return_1, ...]`.

use crate::market::config::Config;
use crate::market::state::MarketState;
use crate::utils::stats::softmax;

const HOLDING_PREFERENCE: f64 = 1.0;

pub trait Owner {
    fn return_probabilities(&self, config: &Config, state: &MarketState) -> Vec<f64>;
}

/// Ignores prices and picks every outcome with equal probability.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UniformOwner;

impl Owner for UniformOwner {
    fn return_probabilities(&self, _config: &Config, state: &MarketState) -> Vec<f64> {
        let options = state.number_of_vendors() + 2;
        vec![1.0 / options as f64; options]
    }
}

/// Returns more often to vendors with a high rebuy price and discards when
/// the best rebuy offer is far below the cheapest purchase offer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RebuyOwner;

impl Owner for RebuyOwner {
    fn return_probabilities(&self, _config: &Config, state: &MarketState) -> Vec<f64> {
        let mut lowest_offer = f64::INFINITY;
        let mut best_rebuy = 0.0f64;
        let mut returns = Vec::with_capacity(state.actions.len());
        for action in &state.actions {
            let refurbished = f64::from(action.price_refurbished()) + 1.0;
            let new = f64::from(action.price_new()) + 1.0;
            let rebuy = f64::from(action.price_rebuy()) + 1.0;
            lowest_offer = lowest_offer.min(refurbished).min(new);
            best_rebuy = best_rebuy.max(rebuy);
            returns.push(rebuy);
        }

        let mut preferences = Vec::with_capacity(2 + returns.len());
        preferences.push(HOLDING_PREFERENCE);
        preferences.push(lowest_offer - best_rebuy);
        preferences.extend(returns);
        softmax(&preferences)
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
            in_circulation: 100,
            vendors: vec![VendorState::default(); actions.len()],
            actions,
        }
    }

    #[test]
    fn uniform_owner_spreads_evenly() {
        let probs = UniformOwner.return_probabilities(&Config::default(), &state(vec![Action::from((2, 4)); 3]));
        assert_eq!(probs, vec![0.2; 5]);
    }

    #[test]
    fn rebuy_owner_matches_the_preference_vector() {
        let probs = RebuyOwner.return_probabilities(
            &Config::default(),
            &state(vec![Action::from((3, 6, 2)), Action::from((4, 5, 1))]),
        );
        // lowest offer 4, best rebuy 3
        let expected = softmax(&[1.0, 1.0, 3.0, 2.0]);
        assert_eq!(probs.len(), 4);
        for (p, e) in probs.iter().zip(expected) {
            assert!((p - e).abs() < 1e-12);
        }
    }

    #[test]
    fn higher_rebuy_price_attracts_more_returns() {
        let probs = RebuyOwner.return_probabilities(
            &Config::default(),
            &state(vec![Action::from((5, 8, 4)), Action::from((5, 8, 0))]),
        );
        assert!(probs[2] > probs[3]);
    }
}
