//! Rule-based vendors of linear economies. All of them price inside
//! `[production_price + 1, max_price - 1]`.

use rand::Rng;

use crate::core::{MarketError, Result};
use crate::market::action::Action;
use crate::market::config::Config;
use crate::market::observation::ObservationLayout;
use crate::market::scenario::Economy;
use crate::utils::rng::{RngStream, rng_from_entropy, rng_from_seed};
use crate::vendors::{Vendor, clamp_price};

fn price_range(config: &Config) -> (i64, i64) {
    (i64::from(config.production_price) + 1, i64::from(config.max_price) - 1)
}

fn layout(config: &Config, observation: &[f32]) -> Result<ObservationLayout> {
    ObservationLayout::for_observation(Economy::Linear, config, observation.len())
}

/// Prices so that its own quality per money matches the best competitor's.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearRatio {
    config: Config,
}

impl LinearRatio {
    pub fn new(config: &Config) -> Self { Self { config: config.clone() } }
}

impl Vendor for LinearRatio {
    fn name(&self) -> &str { "linear-ratio" }

    fn policy(&mut self, observation: &[f32]) -> Result<Action> {
        let layout = layout(&self.config, observation)?;
        let own_quality = f64::from(layout.own_state(observation));
        let mut best_ratio = 0.0f64;
        for opponent in layout.opponents(observation) {
            let quality = opponent.state.ok_or_else(|| {
                MarketError::InvalidObservation("competitor qualities must be visible".into())
            })?;
            best_ratio = best_ratio.max(f64::from(quality) / (f64::from(opponent.price_refurbished()) + 1.0));
        }

        let (low, high) = price_range(&self.config);
        let intended = if best_ratio > 0.0 { (own_quality / best_ratio).floor() as i64 - 1 } else { high };
        Ok(Action::linear(clamp_price(intended, low, high)))
    }
}

/// Picks a uniformly random price every step.
#[derive(Clone, Debug)]
pub struct RandomLinear {
    config: Config,
    rng: RngStream,
}

impl RandomLinear {
    pub fn new(config: &Config) -> Self { Self { config: config.clone(), rng: rng_from_entropy() } }

    pub fn with_seed(config: &Config, seed: u64) -> Self { Self { config: config.clone(), rng: rng_from_seed(seed) } }
}

impl Vendor for RandomLinear {
    fn name(&self) -> &str { "random-linear" }

    fn policy(&mut self, _observation: &[f32]) -> Result<Action> {
        let (low, high) = price_range(&self.config);
        let price = if low >= high { high } else { self.rng.gen_range(low..=high) };
        Ok(Action::linear(clamp_price(price, 0, high)))
    }

    fn reseed(&mut self, seed: u64) { self.rng = rng_from_seed(seed); }
}

/// Follows the first other vendor: asks more when its own quality is higher
/// and less when it is lower. Meant for duopolies.
#[derive(Clone, Debug, PartialEq)]
pub struct TwoPlayerFollower {
    config: Config,
}

impl TwoPlayerFollower {
    pub fn new(config: &Config) -> Self { Self { config: config.clone() } }
}

/// Quality gap separating a slight from a significant difference.
const SIGNIFICANT_QUALITY_GAP: f32 = 15.0;

impl Vendor for TwoPlayerFollower {
    fn name(&self) -> &str { "two-player-follower" }

    fn policy(&mut self, observation: &[f32]) -> Result<Action> {
        let layout = layout(&self.config, observation)?;
        let own_quality = layout.own_state(observation);
        let leader = layout
            .opponents(observation)
            .next()
            .ok_or_else(|| MarketError::InvalidObservation("there is no other vendor to follow".into()))?;
        let leader_quality = leader
            .state
            .ok_or_else(|| MarketError::InvalidObservation("competitor qualities must be visible".into()))?;
        let leader_price = leader.price_refurbished() as i64;

        let shift = if own_quality > leader_quality + SIGNIFICANT_QUALITY_GAP {
            2
        } else if own_quality > leader_quality {
            1
        } else if own_quality == leader_quality {
            0
        } else if own_quality > leader_quality - SIGNIFICANT_QUALITY_GAP {
            -1
        } else {
            -2
        };
        let (low, high) = price_range(&self.config);
        Ok(Action::linear(clamp_price(leader_price + shift, low, high)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_ratio_matches_the_best_value_for_money() {
        let mut vendor = LinearRatio::new(&Config::default());
        // own quality 30; competitors (price 4, quality 20) and (price 1, quality 8)
        let action = vendor.policy(&[30.0, 4.0, 20.0, 1.0, 8.0]).expect("valid observation");
        // best ratio 4.0 -> floor(30 / 4) - 1 = 6
        assert_eq!(action, Action::from(6));
    }

    #[test]
    fn linear_ratio_stays_in_range() {
        let mut vendor = LinearRatio::new(&Config::default());
        assert_eq!(vendor.policy(&[1.0, 0.0, 50.0]).expect("valid"), Action::from(4));
        assert_eq!(vendor.policy(&[50.0, 9.0, 1.0]).expect("valid"), Action::from(9));
        assert_eq!(vendor.policy(&[25.0]).expect("monopoly"), Action::from(9));
    }

    #[test]
    fn random_linear_is_reproducible_and_in_range() {
        let config = Config::default();
        let mut a = RandomLinear::with_seed(&config, 5);
        let mut b = RandomLinear::new(&config);
        b.reseed(5);
        for _ in 0..100 {
            let x = a.policy(&[]).expect("always valid");
            assert_eq!(x, b.policy(&[]).expect("always valid"));
            assert!((4.0..=9.0).contains(&x.price()));
        }
    }

    #[test]
    fn follower_shifts_with_the_quality_gap() {
        let mut vendor = TwoPlayerFollower::new(&Config::default());
        // [own quality, leader price, leader quality]
        assert_eq!(vendor.policy(&[40.0, 6.0, 20.0]).expect("valid"), Action::from(8));
        assert_eq!(vendor.policy(&[25.0, 6.0, 20.0]).expect("valid"), Action::from(7));
        assert_eq!(vendor.policy(&[20.0, 6.0, 20.0]).expect("valid"), Action::from(6));
        assert_eq!(vendor.policy(&[15.0, 6.0, 20.0]).expect("valid"), Action::from(5));
        assert_eq!(vendor.policy(&[1.0, 6.0, 20.0]).expect("valid"), Action::from(4));
        assert_eq!(vendor.policy(&[40.0, 9.0, 20.0]).expect("valid"), Action::from(9));
    }

    #[test]
    fn follower_needs_someone_to_follow() {
        let mut vendor = TwoPlayerFollower::new(&Config::default());
        assert!(vendor.policy(&[20.0]).is_err());
    }
}
