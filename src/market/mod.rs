//! Market simulation: configuration, state, customers, owners and the
//! step loop tying them together.

pub mod action;
pub mod config;
pub mod customer;
pub mod info;
pub mod observation;
pub mod owner;
pub mod scenario;
pub mod sim_market;
pub mod state;

pub use action::{Action, ActionSpace};
pub use config::{Config, ConfigurableField, FieldKind, PRICE_LIMIT, Rule, STORAGE_LIMIT};
#[cfg(feature = "nalgebra")]
pub use customer::LearnedCustomer;
pub use customer::{CircularCustomer, Customer, LinearCustomer};
pub use info::{CircularInfo, EconomyInfo, LinearInfo, StepInfo};
pub use observation::{Observation, ObservationLayout, OpponentView};
pub use owner::{Owner, RebuyOwner, UniformOwner};
pub use scenario::{Economy, Scenario};
pub use sim_market::{EpisodeSummary, SimMarket};
pub use state::{MarketState, VendorState};
