//! Market scenarios: which economy is simulated and who competes in it.

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::core::Result;
use crate::market::config::{BASE_FIELDS, ConfigurableField, FLAG_FIELDS, Config};
use crate::vendors::{FixedPrice, LinearRatio, RandomLinear, StorageMinimizer, StorageThreshold, TwoPlayerFollower, Undercutting, Vendor, VendorKind};

/// The kind of economy a market simulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Economy {
    /// One product per vendor, sold new; vendors differ in quality.
    Linear,
    /// New and refurbished products; owners return products for free.
    Circular,
    /// Circular economy where vendors pay owners a rebuy price.
    CircularRebuy,
}

impl Economy {
    /// Number of prices in one action.
    pub fn price_dimensions(self) -> usize {
        match self {
            Economy::Linear => 1,
            Economy::Circular => 2,
            Economy::CircularRebuy => 3,
        }
    }

    pub fn is_circular(self) -> bool { !matches!(self, Economy::Linear) }

    pub fn has_rebuy_price(self) -> bool { matches!(self, Economy::CircularRebuy) }

    /// Length of a customer distribution with `vendors` vendors.
    pub fn customer_outcomes(self, vendors: usize) -> usize {
        if self.is_circular() { 1 + 2 * vendors } else { 1 + vendors }
    }

    /// Length of an owner distribution with `vendors` vendors.
    pub fn owner_outcomes(self, vendors: usize) -> usize { 2 + vendors }
}

/// Every predefined market set-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scenario {
    LinearMonopoly,
    LinearDuopoly,
    LinearOligopoly,
    CircularMonopoly,
    CircularDuopoly,
    CircularOligopoly,
    CircularRebuyMonopoly,
    CircularRebuyDuopoly,
    CircularRebuyOligopoly,
}

impl Scenario {
    pub fn economy(self) -> Economy {
        use Scenario::*;
        match self {
            LinearMonopoly | LinearDuopoly | LinearOligopoly => Economy::Linear,
            CircularMonopoly | CircularDuopoly | CircularOligopoly => Economy::Circular,
            CircularRebuyMonopoly | CircularRebuyDuopoly | CircularRebuyOligopoly => Economy::CircularRebuy,
        }
    }

    /// Number of competitors the scenario is built for.
    /// `None` means any number (oligopolies accept arbitrary line-ups).
    pub fn get_num_competitors(self) -> Option<usize> {
        use Scenario::*;
        match self {
            LinearMonopoly | CircularMonopoly | CircularRebuyMonopoly => Some(0),
            LinearDuopoly | CircularDuopoly | CircularRebuyDuopoly => Some(1),
            LinearOligopoly | CircularOligopoly | CircularRebuyOligopoly => None,
        }
    }

    /// Vendor kinds that produce valid actions in this scenario's economy.
    pub fn get_competitor_classes(self) -> Vec<VendorKind> {
        let economy = self.economy();
        let mut kinds: Vec<VendorKind> = VendorKind::iter()
            .filter(|kind| kind.supports(economy) && kind.is_rule_based())
            .collect();
        kinds.sort_by_key(|kind| kind.to_string());
        kinds
    }

    /// Identifiers of the learning agents an external trainer can plug in.
    pub fn get_possible_rl_agents(self) -> Vec<&'static str> {
        let mut agents = vec![
            "q-learning",
            "discrete-actor-critic",
            "continuous-actor-critic",
            "stable-baselines-a2c",
            "stable-baselines-ppo",
        ];
        if self.economy().is_circular() {
            agents.extend(["stable-baselines-ddpg", "stable-baselines-td3", "stable-baselines-sac"]);
        }
        agents
    }

    /// Fields of [`Config`] this scenario reads.
    pub fn get_configurable_fields(self) -> Vec<ConfigurableField> {
        let mut fields = BASE_FIELDS.to_vec();
        if self.economy() == Economy::Linear {
            fields.extend(FLAG_FIELDS.iter().take(3).copied());
        }
        fields
    }

    /// The competitor line-up this scenario plays against.
    pub fn default_competitors(self, config: &Config) -> Result<Vec<Box<dyn Vendor>>> {
        use Scenario::*;
        let economy = self.economy();
        let competitors: Vec<Box<dyn Vendor>> = match self {
            LinearMonopoly | CircularMonopoly | CircularRebuyMonopoly => Vec::new(),
            LinearDuopoly => vec![Box::new(LinearRatio::new(config))],
            LinearOligopoly => vec![
                Box::new(LinearRatio::new(config)),
                Box::new(RandomLinear::new(config)),
                Box::new(TwoPlayerFollower::new(config)),
            ],
            CircularDuopoly => vec![Box::new(StorageThreshold::new(config, economy))],
            CircularOligopoly => vec![
                Box::new(StorageThreshold::new(config, economy)),
                Box::new(StorageThreshold::new(config, economy)),
                Box::new(FixedPrice::clamped(economy, vec![3, 5], config)?),
                Box::new(FixedPrice::clamped(economy, vec![2, 6], config)?),
            ],
            CircularRebuyDuopoly => vec![Box::new(Undercutting::new(config))],
            CircularRebuyOligopoly => vec![
                Box::new(Undercutting::new(config)),
                Box::new(StorageThreshold::new(config, economy)),
                Box::new(FixedPrice::clamped(economy, vec![3, 6, 2], config)?),
                Box::new(StorageMinimizer::new(config)),
            ],
        };
        Ok(competitors)
    }
}
