use crate::market::action::Action;

/// State held by one vendor. Circular markets use `in_storage`, linear
/// markets use `quality`; the other field stays zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VendorState {
    pub in_storage: u32,
    pub quality: u32,
}

/// Everything customers, owners and observations are computed from.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketState {
    pub step_counter: u32,
    /// Products currently held by owners (circular markets only).
    pub in_circulation: u32,
    /// Indexed by vendor; vendor 0 is the agent.
    pub vendors: Vec<VendorState>,
    /// Last action of every vendor, same indexing as `vendors`.
    pub actions: Vec<Action>,
}

impl MarketState {
    pub fn number_of_vendors(&self) -> usize { self.vendors.len() }
}
