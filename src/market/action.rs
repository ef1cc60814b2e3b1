//! Vendor actions and the spaces they must belong to.

use rand::Rng;

use crate::market::config::Config;
use crate::market::scenario::Economy;
use crate::spaces::{BoxSpace, Discrete, MultiDiscrete, Space};

/// The prices a vendor sets for the next customers.
///
/// Linear markets carry a single price; circular markets carry
/// `(refurbished, new)` and, with rebuy, `(refurbished, new, rebuy)`.
/// Discrete actions are stored as integer-valued floats.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    prices: Vec<f32>,
}

impl Action {
    pub fn linear(price: u32) -> Self { Self { prices: vec![price as f32] } }

    pub fn circular(refurbished: u32, new: u32) -> Self {
        Self { prices: vec![refurbished as f32, new as f32] }
    }

    pub fn rebuy(refurbished: u32, new: u32, rebuy: u32) -> Self {
        Self { prices: vec![refurbished as f32, new as f32, rebuy as f32] }
    }

    pub fn continuous(prices: Vec<f32>) -> Self { Self { prices } }

    pub fn prices(&self) -> &[f32] { &self.prices }
    pub fn len(&self) -> usize { self.prices.len() }
    pub fn is_empty(&self) -> bool { self.prices.is_empty() }

    /// Linear price.
    pub fn price(&self) -> f32 { self.prices.first().copied().unwrap_or_default() }
    pub fn price_refurbished(&self) -> f32 { self.price() }
    pub fn price_new(&self) -> f32 { self.prices.get(1).copied().unwrap_or_default() }
    /// Rebuy price; zero for actions without one.
    pub fn price_rebuy(&self) -> f32 { self.prices.get(2).copied().unwrap_or_default() }

    /// Integer prices when every component is a non-negative whole number.
    pub fn as_discrete(&self) -> Option<Vec<u32>> {
        self.prices
            .iter()
            .map(|&p| (p.is_finite() && p >= 0.0 && p.fract() == 0.0).then_some(p as u32))
            .collect()
    }
}

impl From<u32> for Action {
    fn from(price: u32) -> Self { Action::linear(price) }
}

impl From<(u32, u32)> for Action {
    fn from((refurbished, new): (u32, u32)) -> Self { Action::circular(refurbished, new) }
}

impl From<(u32, u32, u32)> for Action {
    fn from((refurbished, new, rebuy): (u32, u32, u32)) -> Self { Action::rebuy(refurbished, new, rebuy) }
}

impl From<Vec<f32>> for Action {
    fn from(prices: Vec<f32>) -> Self { Action::continuous(prices) }
}

/// Action space of a market: `Discrete(max_price)` for linear markets,
/// a tuple of `Discrete(max_price)` for circular ones, or a price box when
/// continuous actions are enabled.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionSpace {
    Discrete(Discrete),
    MultiDiscrete(MultiDiscrete),
    Continuous(BoxSpace),
}

impl ActionSpace {
    pub fn for_economy(economy: Economy, config: &Config) -> Self {
        let dims = economy.price_dimensions();
        if config.support_continuous_action_space {
            ActionSpace::Continuous(BoxSpace::uniform(dims, 0.0, config.max_price as f32))
        } else if dims == 1 {
            ActionSpace::Discrete(Discrete::new(config.max_price))
        } else {
            ActionSpace::MultiDiscrete(MultiDiscrete::new(vec![config.max_price; dims]))
        }
    }

    pub fn contains(&self, action: &Action) -> bool {
        match self {
            ActionSpace::Discrete(space) => match action.as_discrete().as_deref() {
                Some([price]) => space.contains(price),
                _ => false,
            },
            ActionSpace::MultiDiscrete(space) => match action.as_discrete() {
                Some(prices) => space.contains(&prices),
                None => false,
            },
            ActionSpace::Continuous(space) => space.contains_slice(action.prices()),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        match self {
            ActionSpace::Discrete(space) => Action::linear(space.sample(rng)),
            ActionSpace::MultiDiscrete(space) => {
                Action::continuous(space.sample(rng).into_iter().map(|p| p as f32).collect())
            }
            ActionSpace::Continuous(space) => Action::continuous(space.sample(rng)),
        }
    }

    /// Number of price components.
    pub fn dimension(&self) -> usize {
        match self {
            ActionSpace::Discrete(_) => 1,
            ActionSpace::MultiDiscrete(space) => space.ndim(),
            ActionSpace::Continuous(space) => space.shape(),
        }
    }

    /// Number of distinct discrete actions; `None` for continuous spaces.
    pub fn n_actions(&self) -> Option<u64> {
        match self {
            ActionSpace::Discrete(space) => Some(space.n() as u64),
            ActionSpace::MultiDiscrete(space) => Some(space.cardinality()),
            ActionSpace::Continuous(_) => None,
        }
    }

    pub fn is_continuous(&self) -> bool { matches!(self, ActionSpace::Continuous(_)) }

    /// Clamp a continuous action into the price box. Discrete spaces and
    /// actions of the wrong length are returned unchanged.
    pub fn clip(&self, action: &Action) -> Action {
        match self {
            ActionSpace::Continuous(space) if space.shape() == action.len() => {
                Action::continuous(space.clip(action.prices()))
            }
            _ => action.clone(),
        }
    }
}
