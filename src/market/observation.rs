//! Layout of the observation vector each vendor receives.
//!
//! For a viewing vendor `v` the vector is
//! `[common state?] ++ [own state] ++ for u != v: [u's last action] ++ [u's state?]`.
//! The common state is only present when `common_state_visibility` is on and
//! the economy has one; other vendors' states only when
//! `opposite_own_state_visibility` is on. Rule-based vendors parse their
//! observations with the same layout.

use crate::core::{MarketError, Result};
use crate::market::config::Config;
use crate::market::scenario::Economy;
use crate::market::state::{MarketState, VendorState};
use crate::spaces::BoxSpace;

/// Observation vector as handed to vendors.
pub type Observation = Vec<f32>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObservationLayout {
    economy: Economy,
    number_of_vendors: usize,
    common_state_visibility: bool,
    opposite_own_state_visibility: bool,
}

/// One other vendor as seen in an observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpponentView<'a> {
    pub prices: &'a [f32],
    pub state: Option<f32>,
}

impl OpponentView<'_> {
    pub fn price_refurbished(&self) -> f32 { self.prices[0] }
    pub fn price_new(&self) -> f32 { self.prices.get(1).copied().unwrap_or_default() }
    pub fn price_rebuy(&self) -> f32 { self.prices.get(2).copied().unwrap_or_default() }
}

impl ObservationLayout {
    pub fn new(economy: Economy, number_of_vendors: usize, config: &Config) -> Self {
        Self {
            economy,
            number_of_vendors,
            common_state_visibility: config.common_state_visibility,
            opposite_own_state_visibility: config.opposite_own_state_visibility,
        }
    }

    /// Recover the layout of an observation of length `len`.
    pub fn for_observation(economy: Economy, config: &Config, len: usize) -> Result<Self> {
        let single = Self::new(economy, 1, config);
        let head = single.common_len() + 1;
        let stride = single.opponent_stride();
        if len < head || (len - head) % stride != 0 {
            return Err(MarketError::InvalidObservation(format!(
                "an observation of length {len} does not fit a {economy} market"
            )));
        }
        Ok(Self::new(economy, 1 + (len - head) / stride, config))
    }

    pub fn economy(&self) -> Economy { self.economy }
    pub fn number_of_vendors(&self) -> usize { self.number_of_vendors }

    pub fn common_len(&self) -> usize {
        if self.common_state_visibility && self.economy.is_circular() { 1 } else { 0 }
    }

    pub fn own_state_index(&self) -> usize { self.common_len() }

    pub fn opponent_stride(&self) -> usize {
        self.economy.price_dimensions() + usize::from(self.opposite_own_state_visibility)
    }

    pub fn len(&self) -> usize {
        self.common_len() + 1 + (self.number_of_vendors - 1) * self.opponent_stride()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn common_state(&self, observation: &[f32]) -> Option<f32> {
        (self.common_len() > 0).then(|| observation[0])
    }

    pub fn own_state(&self, observation: &[f32]) -> f32 { observation[self.own_state_index()] }

    /// The other vendors in index order, skipping the viewer.
    pub fn opponents<'a>(&self, observation: &'a [f32]) -> impl Iterator<Item = OpponentView<'a>> + 'a {
        let start = self.own_state_index() + 1;
        let stride = self.opponent_stride();
        let prices = self.economy.price_dimensions();
        let with_state = self.opposite_own_state_visibility;
        observation[start.min(observation.len())..]
            .chunks_exact(stride)
            .map(move |chunk| OpponentView {
                prices: &chunk[..prices],
                state: with_state.then(|| chunk[prices]),
            })
    }

    fn vendor_state(&self, vendor: &VendorState) -> f32 {
        if self.economy.is_circular() { vendor.in_storage as f32 } else { vendor.quality as f32 }
    }

    /// Build the observation of vendor `view`.
    pub fn build(&self, state: &MarketState, view: usize) -> Observation {
        let mut observation = Vec::with_capacity(self.len());
        if self.common_len() > 0 {
            observation.push(state.in_circulation as f32);
        }
        observation.push(self.vendor_state(&state.vendors[view]));
        for (index, vendor) in state.vendors.iter().enumerate() {
            if index == view {
                continue;
            }
            observation.extend_from_slice(state.actions[index].prices());
            if self.opposite_own_state_visibility {
                observation.push(self.vendor_state(vendor));
            }
        }
        observation
    }

    /// Box bounds matching `build`.
    pub fn space(&self, config: &Config) -> BoxSpace {
        let state_high = if self.economy.is_circular() { config.max_storage } else { config.max_quality } as f32;
        let mut high = Vec::with_capacity(self.len());
        if self.common_len() > 0 {
            high.push(config.max_circulation() as f32);
        }
        high.push(state_high);
        for _ in 1..self.number_of_vendors {
            high.extend(std::iter::repeat_n(config.max_price as f32, self.economy.price_dimensions()));
            if self.opposite_own_state_visibility {
                high.push(state_high);
            }
        }
        BoxSpace::new(vec![0.0; high.len()], high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::action::Action;

    fn rebuy_duopoly_state() -> MarketState {
        MarketState {
            step_counter: 0,
            in_circulation: 120,
            vendors: vec![VendorState { in_storage: 17, quality: 0 }, VendorState { in_storage: 4, quality: 0 }],
            actions: vec![Action::from((1, 2, 3)), Action::from((5, 7, 2))],
        }
    }

    #[test]
    fn full_visibility_layout() {
        let config = Config::default();
        let layout = ObservationLayout::new(Economy::CircularRebuy, 2, &config);
        let obs = layout.build(&rebuy_duopoly_state(), 0);
        assert_eq!(obs, vec![120.0, 17.0, 5.0, 7.0, 2.0, 4.0]);
        assert_eq!(layout.len(), 6);
        assert!(layout.space(&config).contains_slice(&obs));

        let competitor_view = layout.build(&rebuy_duopoly_state(), 1);
        assert_eq!(competitor_view, vec![120.0, 4.0, 1.0, 2.0, 3.0, 17.0]);
    }

    #[test]
    fn hidden_parts_are_left_out() {
        let config = Config {
            common_state_visibility: false,
            opposite_own_state_visibility: false,
            ..Config::default()
        };
        let layout = ObservationLayout::new(Economy::CircularRebuy, 2, &config);
        assert_eq!(layout.build(&rebuy_duopoly_state(), 0), vec![17.0, 5.0, 7.0, 2.0]);
        assert_eq!(layout.len(), 4);
    }

    #[test]
    fn layout_is_recovered_from_length() {
        let config = Config::default();
        let layout = ObservationLayout::for_observation(Economy::CircularRebuy, &config, 6).expect("fits");
        assert_eq!(layout.number_of_vendors(), 2);
        let obs = layout.build(&rebuy_duopoly_state(), 0);
        let opponents: Vec<_> = layout.opponents(&obs).collect();
        assert_eq!(opponents.len(), 1);
        assert_eq!(opponents[0].prices, &[5.0, 7.0, 2.0]);
        assert_eq!(opponents[0].state, Some(4.0));
        assert_eq!(layout.own_state(&obs), 17.0);
        assert_eq!(layout.common_state(&obs), Some(120.0));

        assert!(ObservationLayout::for_observation(Economy::CircularRebuy, &config, 5).is_err());
    }

    #[test]
    fn linear_markets_have_no_common_state() {
        let config = Config::default();
        let layout = ObservationLayout::new(Economy::Linear, 3, &config);
        let state = MarketState {
            step_counter: 0,
            in_circulation: 0,
            vendors: vec![
                VendorState { in_storage: 0, quality: 20 },
                VendorState { in_storage: 0, quality: 30 },
                VendorState { in_storage: 0, quality: 40 },
            ],
            actions: vec![Action::from(4), Action::from(5), Action::from(6)],
        };
        assert_eq!(layout.build(&state, 1), vec![30.0, 4.0, 20.0, 6.0, 40.0]);
        assert_eq!(layout.space(&config).high(), &[50.0, 10.0, 50.0, 10.0, 50.0]);
    }
}
