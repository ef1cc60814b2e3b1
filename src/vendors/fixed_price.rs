use crate::core::{MarketError, Result};
use crate::market::action::Action;
use crate::market::config::Config;
use crate::market::scenario::Economy;
use crate::vendors::{Vendor, clamp_price};

/// Always answers with the same prices.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedPrice {
    name: String,
    action: Action,
}

impl FixedPrice {
    /// `prices` must hold one price per action component of `economy`.
    pub fn new(economy: Economy, prices: Vec<u32>) -> Result<Self> {
        if prices.len() != economy.price_dimensions() {
            return Err(MarketError::Config(format!(
                "a fixed price vendor in a {economy} market needs {} prices, got {}",
                economy.price_dimensions(),
                prices.len()
            )));
        }
        let label = prices.iter().map(u32::to_string).collect::<Vec<_>>().join("-");
        Ok(Self {
            name: format!("fixed-price-{label}"),
            action: Action::continuous(prices.into_iter().map(|p| p as f32).collect()),
        })
    }

    /// Like [`FixedPrice::new`], with every price pulled into
    /// `[0, max_price - 1]` so the action is valid for `config`.
    pub fn clamped(economy: Economy, prices: Vec<u32>, config: &Config) -> Result<Self> {
        let top = i64::from(config.max_price) - 1;
        Self::new(economy, prices.into_iter().map(|p| clamp_price(i64::from(p), 0, top)).collect())
    }

    /// `production_price + 3` in linear markets, `(2, 4)` in circular ones
    /// and `(3, 6, 2)` with rebuy prices, clamped below `max_price`.
    pub fn default_for(economy: Economy, config: &Config) -> Self {
        let prices = match economy {
            Economy::Linear => vec![config.production_price.saturating_add(3)],
            Economy::Circular => vec![2, 4],
            Economy::CircularRebuy => vec![3, 6, 2],
        };
        let top = i64::from(config.max_price) - 1;
        let prices: Vec<f32> = prices.into_iter().map(|p| clamp_price(i64::from(p), 0, top) as f32).collect();
        Self { name: "fixed-price".into(), action: Action::continuous(prices) }
    }

    pub fn action(&self) -> &Action { &self.action }
}

impl Vendor for FixedPrice {
    fn name(&self) -> &str { &self.name }

    fn policy(&mut self, _observation: &[f32]) -> Result<Action> { Ok(self.action.clone()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_the_configured_prices() {
        let mut vendor = FixedPrice::new(Economy::Circular, vec![3, 5]).expect("two prices");
        assert_eq!(vendor.policy(&[]).expect("fixed").prices(), &[3.0, 5.0]);
        assert_eq!(vendor.name(), "fixed-price-3-5");
    }

    #[test]
    fn rejects_the_wrong_number_of_prices() {
        assert!(FixedPrice::new(Economy::CircularRebuy, vec![3, 5]).is_err());
        assert!(FixedPrice::new(Economy::Linear, vec![]).is_err());
    }

    #[test]
    fn defaults_per_economy() {
        let config = Config::default();
        assert_eq!(FixedPrice::default_for(Economy::Linear, &config).action(), &Action::from(6));
        assert_eq!(FixedPrice::default_for(Economy::Circular, &config).action(), &Action::from((2, 4)));
        assert_eq!(FixedPrice::default_for(Economy::CircularRebuy, &config).action(), &Action::from((3, 6, 2)));
    }

    #[test]
    fn prices_stay_below_a_small_max_price() {
        let config = Config { max_price: 5, production_price: 3, ..Config::default() };
        let vendor = FixedPrice::clamped(Economy::Circular, vec![2, 6], &config).expect("two prices");
        assert_eq!(vendor.action(), &Action::from((2, 4)));
        assert_eq!(vendor.name(), "fixed-price-2-4");
        assert_eq!(FixedPrice::default_for(Economy::Linear, &config).action(), &Action::from(4));
        assert_eq!(FixedPrice::default_for(Economy::CircularRebuy, &config).action(), &Action::from((3, 4, 2)));
    }
}
