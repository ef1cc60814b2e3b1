//! Per-step record of what happened in a market.
//!
//! [`StepInfo`] is built fresh by every step and can be flattened into an
//! [`Info`] map whose keys are the property paths used by the watcher.

use crate::core::{Info, InfoValue};
use crate::market::scenario::Economy;
use crate::market::state::MarketState;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepInfo {
    /// Customers that bought nothing this step.
    pub buy_nothing: u64,
    /// Customers simulated this step.
    pub incoming: u64,
    /// Final profit of every vendor.
    pub profits_all: Vec<f64>,
    pub details: EconomyInfo,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EconomyInfo {
    Linear(LinearInfo),
    Circular(CircularInfo),
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearInfo {
    pub purchases: Vec<u64>,
    pub quality: Vec<u32>,
    pub price: Vec<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircularInfo {
    pub purchases_new: Vec<u64>,
    pub purchases_refurbished: Vec<u64>,
    /// Refurbished demand that found an empty storage. Only charged through
    /// the stockout penalty, never flattened into the info map.
    pub unmet_refurbished: Vec<u64>,
    pub throw_away: u64,
    pub rebuys: Vec<u64>,
    /// Money paid to owners; stored as a negative amount.
    pub rebuy_cost: Vec<f64>,
    /// Refurbished revenue minus stockout penalties.
    pub by_selling_refurbished: Vec<f64>,
    pub by_selling_new: Vec<f64>,
    /// Stored as a negative amount.
    pub storage_cost: Vec<f64>,
    pub in_storage: Vec<u32>,
    pub in_circulation: u32,
    pub price_refurbished: Vec<f32>,
    pub price_new: Vec<f32>,
    /// Only present in rebuy markets.
    pub price_rebuy: Option<Vec<f32>>,
}

impl StepInfo {
    /// Zeroed record carrying a snapshot of `state` and the current actions.
    pub fn new(economy: Economy, state: &MarketState) -> Self {
        let n = state.number_of_vendors();
        let details = if economy.is_circular() {
            EconomyInfo::Circular(CircularInfo {
                purchases_new: vec![0; n],
                purchases_refurbished: vec![0; n],
                unmet_refurbished: vec![0; n],
                throw_away: 0,
                rebuys: vec![0; n],
                rebuy_cost: vec![0.0; n],
                by_selling_refurbished: vec![0.0; n],
                by_selling_new: vec![0.0; n],
                storage_cost: vec![0.0; n],
                in_storage: state.vendors.iter().map(|v| v.in_storage).collect(),
                in_circulation: state.in_circulation,
                price_refurbished: state.actions.iter().map(|a| a.price_refurbished()).collect(),
                price_new: state.actions.iter().map(|a| a.price_new()).collect(),
                price_rebuy: economy
                    .has_rebuy_price()
                    .then(|| state.actions.iter().map(|a| a.price_rebuy()).collect()),
            })
        } else {
            EconomyInfo::Linear(LinearInfo {
                purchases: vec![0; n],
                quality: state.vendors.iter().map(|v| v.quality).collect(),
                price: state.actions.iter().map(|a| a.price()).collect(),
            })
        };
        Self { buy_nothing: 0, incoming: 0, profits_all: vec![0.0; n], details }
    }

    pub fn circular(&self) -> Option<&CircularInfo> {
        match &self.details {
            EconomyInfo::Circular(info) => Some(info),
            EconomyInfo::Linear(_) => None,
        }
    }

    pub fn circular_mut(&mut self) -> Option<&mut CircularInfo> {
        match &mut self.details {
            EconomyInfo::Circular(info) => Some(info),
            EconomyInfo::Linear(_) => None,
        }
    }

    pub fn linear(&self) -> Option<&LinearInfo> {
        match &self.details {
            EconomyInfo::Linear(info) => Some(info),
            EconomyInfo::Circular(_) => None,
        }
    }

    pub fn linear_mut(&mut self) -> Option<&mut LinearInfo> {
        match &mut self.details {
            EconomyInfo::Linear(info) => Some(info),
            EconomyInfo::Circular(_) => None,
        }
    }

    /// Flatten into an [`Info`] map keyed by property path.
    pub fn to_info(&self) -> Info {
        let mut info = Info::new();
        info.insert("customer/buy_nothing", self.buy_nothing.into());
        info.insert("customer/incoming", self.incoming.into());
        match &self.details {
            EconomyInfo::Linear(linear) => {
                info.insert("customer/purchases", InfoValue::per_vendor(linear.purchases.iter().copied()));
                info.insert("profits/all", InfoValue::per_vendor(self.profits_all.iter().copied()));
                info.insert("state/quality", InfoValue::per_vendor(linear.quality.iter().copied()));
                info.insert("actions/price", InfoValue::per_vendor(linear.price.iter().copied()));
            }
            EconomyInfo::Circular(c) => {
                info.insert("customer/purchases_new", InfoValue::per_vendor(c.purchases_new.iter().copied()));
                info.insert(
                    "customer/purchases_refurbished",
                    InfoValue::per_vendor(c.purchases_refurbished.iter().copied()),
                );
                info.insert("owner/throw_away", c.throw_away.into());
                info.insert("owner/rebuys", InfoValue::per_vendor(c.rebuys.iter().copied()));
                info.insert("profits/rebuy_cost", InfoValue::per_vendor(c.rebuy_cost.iter().copied()));
                info.insert(
                    "profits/by_selling_refurbished",
                    InfoValue::per_vendor(c.by_selling_refurbished.iter().copied()),
                );
                info.insert("profits/by_selling_new", InfoValue::per_vendor(c.by_selling_new.iter().copied()));
                info.insert("profits/storage_cost", InfoValue::per_vendor(c.storage_cost.iter().copied()));
                info.insert("profits/all", InfoValue::per_vendor(self.profits_all.iter().copied()));
                info.insert("state/in_storage", InfoValue::per_vendor(c.in_storage.iter().copied()));
                info.insert("state/in_circulation", c.in_circulation.into());
                info.insert("actions/price_refurbished", InfoValue::per_vendor(c.price_refurbished.iter().copied()));
                info.insert("actions/price_new", InfoValue::per_vendor(c.price_new.iter().copied()));
                if let Some(rebuy) = &c.price_rebuy {
                    info.insert("actions/price_rebuy", InfoValue::per_vendor(rebuy.iter().copied()));
                }
            }
        }
        info
    }
}

impl From<&StepInfo> for Info {
    fn from(step_info: &StepInfo) -> Self { step_info.to_info() }
}

impl From<StepInfo> for Info {
    fn from(step_info: StepInfo) -> Self { step_info.to_info() }
}
