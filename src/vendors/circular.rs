//! Rule-based vendors of circular economies.
//!
//! All of them look at their own storage and react in four regimes,
//! separated at `max_storage / 15`, `max_storage / 10` and `max_storage / 8`.

use crate::core::{MarketError, Result};
use crate::market::action::Action;
use crate::market::config::Config;
use crate::market::observation::ObservationLayout;
use crate::market::scenario::Economy;
use crate::vendors::{Vendor, clamp_price};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StorageRegime {
    FillImmediately,
    Fill,
    Ok,
    Overfull,
}

impl StorageRegime {
    fn of(in_storage: f32, config: &Config) -> Self {
        let max_storage = config.max_storage as f32;
        if in_storage < max_storage / 15.0 {
            StorageRegime::FillImmediately
        } else if in_storage < max_storage / 10.0 {
            StorageRegime::Fill
        } else if in_storage < max_storage / 8.0 {
            StorageRegime::Ok
        } else {
            StorageRegime::Overfull
        }
    }
}

/// `floor(tenths * max_price / 10)`
fn tenths(config: &Config, tenths: u32) -> i64 { i64::from(config.max_price) * i64::from(tenths) / 10 }

fn own_storage(economy: Economy, config: &Config, observation: &[f32]) -> Result<f32> {
    let layout = ObservationLayout::for_observation(economy, config, observation.len())?;
    Ok(layout.own_state(observation))
}

/// Sets prices from its own storage level only.
///
/// | in_storage <   | refurbished | new          | rebuy           |
/// |----------------|-------------|--------------|-----------------|
/// | max_storage/15 | 6/10 max    | prod + 6/10  | refurbished - 1 |
/// | max_storage/10 | 5/10 max    | prod + 5/10  | refurbished - 2 |
/// | max_storage/8  | 4/10 max    | prod + 4/10  | refurbished / 2 |
/// | otherwise      | 2/10 max    | prod + 7/10  | 0               |
///
/// The new price is capped at `max_price - 1`; the rebuy price at zero from below.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageThreshold {
    config: Config,
    economy: Economy,
}

impl StorageThreshold {
    pub fn new(config: &Config, economy: Economy) -> Self { Self { config: config.clone(), economy } }

    /// Prices for a given storage level as `(refurbished, new, rebuy)`.
    pub fn prices_for(&self, in_storage: f32) -> (u32, u32, u32) {
        let config = &self.config;
        let production = i64::from(config.production_price);
        let (refurbished, new, rebuy) = match StorageRegime::of(in_storage, config) {
            StorageRegime::FillImmediately => {
                let r = tenths(config, 6);
                (r, production + tenths(config, 6), r - 1)
            }
            StorageRegime::Fill => {
                let r = tenths(config, 5);
                (r, production + tenths(config, 5), r - 2)
            }
            StorageRegime::Ok => {
                let r = tenths(config, 4);
                (r, production + tenths(config, 4), r / 2)
            }
            StorageRegime::Overfull => (tenths(config, 2), production + tenths(config, 7), 0),
        };
        let top = i64::from(config.max_price) - 1;
        let new = clamp_price(new, 0, top);
        let refurbished = clamp_price(refurbished, 0, i64::from(new));
        (refurbished, new, clamp_price(rebuy, 0, top))
    }
}

impl Vendor for StorageThreshold {
    fn name(&self) -> &str { "storage-threshold" }

    fn policy(&mut self, observation: &[f32]) -> Result<Action> {
        let in_storage = own_storage(self.economy, &self.config, observation)?;
        let (refurbished, new, rebuy) = self.prices_for(in_storage);
        Ok(if self.economy.has_rebuy_price() {
            Action::rebuy(refurbished, new, rebuy)
        } else {
            Action::circular(refurbished, new)
        })
    }
}

/// Undercuts its competitors' new price and positions refurbished and rebuy
/// prices relative to theirs depending on its own storage.
///
/// The references are the cheapest competitor prices for new and
/// refurbished products and the median competitor rebuy price.
#[derive(Clone, Debug, PartialEq)]
pub struct Undercutting {
    config: Config,
}

impl Undercutting {
    pub fn new(config: &Config) -> Self { Self { config: config.clone() } }
}

fn lower_median(mut values: Vec<f32>) -> f32 {
    values.sort_by(f32::total_cmp);
    values[(values.len() - 1) / 2]
}

impl Vendor for Undercutting {
    fn name(&self) -> &str { "undercutting" }

    fn policy(&mut self, observation: &[f32]) -> Result<Action> {
        let config = &self.config;
        let layout = ObservationLayout::for_observation(Economy::CircularRebuy, config, observation.len())?;
        let opponents: Vec<_> = layout.opponents(observation).collect();
        if opponents.is_empty() {
            return Err(MarketError::InvalidObservation(
                "undercutting needs at least one competitor to observe".into(),
            ));
        }
        let own_storage = layout.own_state(observation);
        let cheapest_new = opponents.iter().map(|o| o.price_new()).fold(f32::INFINITY, f32::min) as i64;
        let cheapest_refurbished =
            opponents.iter().map(|o| o.price_refurbished()).fold(f32::INFINITY, f32::min) as i64;
        let rebuy_reference = lower_median(opponents.iter().map(|o| o.price_rebuy()).collect()) as i64;

        let new = (cheapest_new - 1).max(i64::from(config.production_price) + 1);
        let (refurbished, rebuy) = match StorageRegime::of(own_storage, config) {
            StorageRegime::FillImmediately => (cheapest_refurbished + 2, (rebuy_reference + 1).min(2)),
            StorageRegime::Fill => (cheapest_refurbished + 1, rebuy_reference),
            StorageRegime::Ok => {
                let rebuy = (rebuy_reference - 1).max(1);
                ((cheapest_refurbished - 1).max(rebuy + 1), rebuy)
            }
            StorageRegime::Overfull => {
                let rebuy = (rebuy_reference - 2).max(1);
                ((cheapest_refurbished - 2).max(rebuy + 1), rebuy)
            }
        };

        let top = i64::from(config.max_price) - 1;
        Ok(Action::rebuy(clamp_price(refurbished, 0, top), clamp_price(new, 0, top), clamp_price(rebuy, 0, top)))
    }
}

/// Keeps its storage small: while stock is low it asks a high refurbished
/// price and pays a generous rebuy price, as stock grows it dumps refurbished
/// products and stops buying back.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageMinimizer {
    config: Config,
}

impl StorageMinimizer {
    pub fn new(config: &Config) -> Self { Self { config: config.clone() } }

    pub fn prices_for(&self, in_storage: f32) -> (u32, u32, u32) {
        let config = &self.config;
        let (refurbished, rebuy) = match StorageRegime::of(in_storage, config) {
            StorageRegime::FillImmediately => (tenths(config, 7), tenths(config, 4)),
            StorageRegime::Fill => (tenths(config, 5), tenths(config, 2)),
            StorageRegime::Ok => (tenths(config, 3), tenths(config, 1)),
            StorageRegime::Overfull => (tenths(config, 1), 0),
        };
        let top = i64::from(config.max_price) - 1;
        let new = clamp_price(i64::from(config.production_price) + tenths(config, 5), 0, top);
        let refurbished = clamp_price(refurbished, 0, i64::from(new));
        (refurbished, new, clamp_price(rebuy, 0, i64::from(refurbished)))
    }
}

impl Vendor for StorageMinimizer {
    fn name(&self) -> &str { "storage-minimizer" }

    fn policy(&mut self, observation: &[f32]) -> Result<Action> {
        let in_storage = own_storage(Economy::CircularRebuy, &self.config, observation)?;
        let (refurbished, new, rebuy) = self.prices_for(in_storage);
        Ok(Action::rebuy(refurbished, new, rebuy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_threshold_follows_the_table() {
        let vendor = StorageThreshold::new(&Config::default(), Economy::CircularRebuy);
        assert_eq!(vendor.prices_for(0.0), (6, 9, 5));
        assert_eq!(vendor.prices_for(7.0), (5, 8, 3));
        assert_eq!(vendor.prices_for(11.0), (4, 7, 2));
        assert_eq!(vendor.prices_for(12.5), (2, 9, 0));
        assert_eq!(vendor.prices_for(100.0), (2, 9, 0));
    }

    #[test]
    fn storage_threshold_reads_its_own_storage() {
        let mut circular = StorageThreshold::new(&Config::default(), Economy::Circular);
        // [in_circulation, own storage, competitor refurbished, new, storage]
        let action = circular.policy(&[300.0, 3.0, 2.0, 4.0, 60.0]).expect("valid observation");
        assert_eq!(action, Action::from((6, 9)));

        let hidden = Config { common_state_visibility: false, ..Config::default() };
        let mut vendor = StorageThreshold::new(&hidden, Economy::Circular);
        let action = vendor.policy(&[80.0, 2.0, 4.0, 60.0]).expect("valid observation");
        assert_eq!(action, Action::from((2, 9)));
    }

    #[test]
    fn storage_threshold_never_returns_a_negative_rebuy_price() {
        let tiny = Config { max_price: 1, production_price: 0, ..Config::default() };
        let vendor = StorageThreshold::new(&tiny, Economy::CircularRebuy);
        for storage in [0.0, 7.0, 11.0, 50.0] {
            let (refurbished, new, rebuy) = vendor.prices_for(storage);
            assert!(refurbished <= new && new == 0 && rebuy == 0);
        }
    }

    #[test]
    fn undercutting_reacts_to_a_single_competitor() {
        let mut vendor = Undercutting::new(&Config::default());
        // [in_circulation, own storage, refurbished, new, rebuy, competitor storage]
        let fill_now = vendor.policy(&[300.0, 2.0, 4.0, 7.0, 3.0, 20.0]).expect("valid observation");
        assert_eq!(fill_now, Action::from((6, 6, 2)));
        let fill = vendor.policy(&[300.0, 8.0, 4.0, 7.0, 3.0, 20.0]).expect("valid observation");
        assert_eq!(fill, Action::from((5, 6, 3)));
        let ok = vendor.policy(&[300.0, 11.0, 4.0, 7.0, 3.0, 20.0]).expect("valid observation");
        assert_eq!(ok, Action::from((3, 6, 2)));
        let overfull = vendor.policy(&[300.0, 80.0, 4.0, 4.0, 3.0, 20.0]).expect("valid observation");
        assert_eq!(overfull, Action::from((2, 4, 1)));
    }

    #[test]
    fn undercutting_clamps_into_the_price_range() {
        let mut vendor = Undercutting::new(&Config::default());
        let action = vendor.policy(&[0.0, 0.0, 9.0, 9.0, 9.0, 0.0]).expect("valid observation");
        assert_eq!(action, Action::from((9, 8, 2)));
    }

    #[test]
    fn undercutting_uses_the_cheapest_of_many() {
        let mut vendor = Undercutting::new(&Config::default());
        let observation = [
            300.0, 80.0, //
            5.0, 8.0, 4.0, 10.0, //
            3.0, 6.0, 1.0, 10.0, //
            6.0, 9.0, 2.0, 10.0,
        ];
        let action = vendor.policy(&observation).expect("valid observation");
        // cheapest new 6, cheapest refurbished 3, median rebuy 2
        assert_eq!(action, Action::from((2, 5, 1)));
    }

    #[test]
    fn undercutting_without_competitors_is_an_error() {
        let mut vendor = Undercutting::new(&Config::default());
        assert!(matches!(vendor.policy(&[10.0, 5.0]), Err(MarketError::InvalidObservation(_))));
    }

    #[test]
    fn storage_minimizer_dumps_stock_as_it_grows() {
        let vendor = StorageMinimizer::new(&Config::default());
        let (low_refurbished, _, low_rebuy) = vendor.prices_for(0.0);
        let (high_refurbished, _, high_rebuy) = vendor.prices_for(90.0);
        assert!(low_refurbished > high_refurbished);
        assert!(low_rebuy > high_rebuy);
        assert_eq!(high_rebuy, 0);
        for storage in [0.0, 7.0, 11.0, 90.0] {
            let (refurbished, new, rebuy) = vendor.prices_for(storage);
            assert!(rebuy <= refurbished && refurbished <= new && new < 10);
        }
    }
}
