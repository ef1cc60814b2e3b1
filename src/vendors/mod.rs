//! Vendors: everything that sets prices in a market.
//!
//! The market only relies on [`Vendor::policy`]: given the vendor's own
//! observation it returns the next action, which must lie in the market's
//! action space. Rule-based vendors are deterministic given the observation,
//! except [`RandomLinear`] which draws from its own seeded stream.

pub mod circular;
pub mod fixed_price;
pub mod human;
pub mod linear;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::core::Result;
use crate::market::action::Action;
use crate::market::config::Config;
use crate::market::scenario::Economy;

pub use circular::{StorageMinimizer, StorageThreshold, Undercutting};
pub use fixed_price::FixedPrice;
pub use human::HumanVendor;
pub use linear::{LinearRatio, RandomLinear, TwoPlayerFollower};

pub trait Vendor {
    fn name(&self) -> &str;

    /// Next action given this vendor's view of the market.
    fn policy(&mut self, observation: &[f32]) -> Result<Action>;

    /// Reseed any internal randomness. Deterministic vendors ignore this.
    fn reseed(&mut self, _seed: u64) {}
}

impl<V: Vendor + ?Sized> Vendor for Box<V> {
    fn name(&self) -> &str { (**self).name() }
    fn policy(&mut self, observation: &[f32]) -> Result<Action> { (**self).policy(observation) }
    fn reseed(&mut self, seed: u64) { (**self).reseed(seed) }
}

/// Identifiers of the built-in vendors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VendorKind {
    FixedPrice,
    StorageThreshold,
    Undercutting,
    StorageMinimizer,
    LinearRatio,
    RandomLinear,
    TwoPlayerFollower,
    Human,
}

impl VendorKind {
    /// Whether this vendor produces actions for `economy`.
    pub fn supports(self, economy: Economy) -> bool {
        use VendorKind::*;
        match self {
            FixedPrice | Human => true,
            StorageThreshold => economy.is_circular(),
            Undercutting | StorageMinimizer => economy == Economy::CircularRebuy,
            LinearRatio | RandomLinear | TwoPlayerFollower => economy == Economy::Linear,
        }
    }

    pub fn is_rule_based(self) -> bool { self != VendorKind::Human }

    /// Construct a vendor with its default parameters.
    pub fn build(self, config: &Config, economy: Economy) -> Result<Box<dyn Vendor>> {
        if !self.supports(economy) {
            return Err(crate::core::MarketError::Config(format!(
                "vendor {self} cannot act in a {economy} market"
            )));
        }
        let vendor: Box<dyn Vendor> = match self {
            VendorKind::FixedPrice => Box::new(FixedPrice::default_for(economy, config)),
            VendorKind::StorageThreshold => Box::new(StorageThreshold::new(config, economy)),
            VendorKind::Undercutting => Box::new(Undercutting::new(config)),
            VendorKind::StorageMinimizer => Box::new(StorageMinimizer::new(config)),
            VendorKind::LinearRatio => Box::new(LinearRatio::new(config)),
            VendorKind::RandomLinear => Box::new(RandomLinear::new(config)),
            VendorKind::TwoPlayerFollower => Box::new(TwoPlayerFollower::new(config)),
            VendorKind::Human => Box::new(HumanVendor::stdio(economy)),
        };
        Ok(vendor)
    }
}

/// Clamp an integer price into `[low, high]`. `high` wins if the bounds cross.
pub(crate) fn clamp_price(price: i64, low: i64, high: i64) -> u32 {
    price.max(low).min(high).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn kinds_parse_from_kebab_case() {
        assert_eq!(VendorKind::from_str("storage-threshold").expect("known"), VendorKind::StorageThreshold);
        assert_eq!(VendorKind::TwoPlayerFollower.to_string(), "two-player-follower");
        assert!(VendorKind::from_str("rule_based").is_err());
    }

    #[test]
    fn rule_based_kinds_build_for_supported_economies() {
        let config = Config::default();
        for economy in [Economy::Linear, Economy::Circular, Economy::CircularRebuy] {
            for kind in VendorKind::iter().filter(|k| k.is_rule_based()) {
                let built = kind.build(&config, economy);
                assert_eq!(built.is_ok(), kind.supports(economy), "{kind} in {economy}");
            }
        }
    }

    #[test]
    fn clamp_prefers_the_upper_bound() {
        assert_eq!(clamp_price(-3, 0, 9), 0);
        assert_eq!(clamp_price(12, 0, 9), 9);
        assert_eq!(clamp_price(5, 7, 6), 6);
    }
}
