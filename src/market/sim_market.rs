//! The market simulation.
//!
//! One `SimMarket` covers every [`Scenario`]: the scenario picks the economy
//! and the default competitors, the economy picks customers, owners, spaces
//! and the accounting rules. Vendor 0 is the agent driving [`Env::step`];
//! competitors are stepped from inside the market.

use log::{debug, trace, warn};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::core::{Env, MarketError, Result, Step};
use crate::market::action::{Action, ActionSpace};
use crate::market::config::Config;
use crate::market::customer::{CircularCustomer, Customer, LinearCustomer};
use crate::market::info::{CircularInfo, EconomyInfo, LinearInfo, StepInfo};
use crate::market::observation::{Observation, ObservationLayout};
use crate::market::owner::{Owner, RebuyOwner, UniformOwner};
use crate::market::scenario::{Economy, Scenario};
use crate::market::state::{MarketState, VendorState};
use crate::spaces::BoxSpace;
use crate::utils::rng::{RngStream, SeedSequence, rng_from_entropy};
use crate::utils::stats::multinomial;
use crate::vendors::Vendor;

pub struct SimMarket {
    scenario: Scenario,
    economy: Economy,
    config: Config,
    competitors: Vec<Box<dyn Vendor>>,
    customer: Box<dyn Customer>,
    owner: Option<Box<dyn Owner>>,
    layout: ObservationLayout,
    action_space: ActionSpace,
    observation_space: BoxSpace,
    state: MarketState,
    rng: RngStream,
}

/// Rewards and infos of one played episode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeSummary {
    pub rewards: Vec<f64>,
    pub infos: Vec<StepInfo>,
}

impl EpisodeSummary {
    pub fn total_reward(&self) -> f64 { self.rewards.iter().sum() }
}

impl SimMarket {
    /// Market with the scenario's default competitors.
    pub fn new(scenario: Scenario, config: Config) -> Result<Self> {
        let competitors = scenario.default_competitors(&config)?;
        Self::with_competitors(scenario, config, competitors)
    }

    /// Market with a custom competitor line-up. Monopolies and duopolies
    /// insist on their number of competitors.
    pub fn with_competitors(scenario: Scenario, config: Config, competitors: Vec<Box<dyn Vendor>>) -> Result<Self> {
        config.validate()?;
        if let Some(expected) = scenario.get_num_competitors() {
            if competitors.len() != expected {
                return Err(MarketError::Config(format!(
                    "{scenario} needs {expected} competitor(s), got {}",
                    competitors.len()
                )));
            }
        }
        let economy = scenario.economy();
        if economy == Economy::Linear && !competitors.is_empty() && !config.opposite_own_state_visibility {
            return Err(MarketError::Config(
                "linear competitors price by quality and need opposite_own_state_visibility".into(),
            ));
        }

        let number_of_vendors = competitors.len() + 1;
        let layout = ObservationLayout::new(economy, number_of_vendors, &config);
        let customer: Box<dyn Customer> = match economy {
            Economy::Linear => Box::new(LinearCustomer),
            Economy::Circular | Economy::CircularRebuy => Box::new(CircularCustomer),
        };
        let owner: Option<Box<dyn Owner>> = match economy {
            Economy::Linear => None,
            Economy::Circular => Some(Box::new(UniformOwner)),
            Economy::CircularRebuy => Some(Box::new(RebuyOwner)),
        };

        let mut market = Self {
            scenario,
            economy,
            action_space: ActionSpace::for_economy(economy, &config),
            observation_space: layout.space(&config),
            layout,
            competitors,
            customer,
            owner,
            state: MarketState::default(),
            rng: rng_from_entropy(),
            config,
        };
        market.reset_state()?;
        Ok(market)
    }

    /// Reseed the market and, through sub-seeds, every competitor.
    pub fn seed(&mut self, seed: u64) {
        let mut sequence = SeedSequence::new(seed);
        self.rng = sequence.next_rng();
        for competitor in &mut self.competitors {
            competitor.reseed(sequence.next_subseed());
        }
    }

    /// Replace the customer model. Persists across resets.
    pub fn set_customer(&mut self, customer: Box<dyn Customer>) { self.customer = customer; }

    /// Replace the owner model. Linear markets ignore owners.
    pub fn set_owner(&mut self, owner: Box<dyn Owner>) {
        if self.economy.is_circular() {
            self.owner = Some(owner);
        }
    }

    pub fn scenario(&self) -> Scenario { self.scenario }
    pub fn economy(&self) -> Economy { self.economy }
    pub fn config(&self) -> &Config { &self.config }
    pub fn state(&self) -> &MarketState { &self.state }

    /// Direct access to the state, for staging situations in tests and
    /// analyses. The caller is responsible for keeping it within bounds.
    pub fn state_mut(&mut self) -> &mut MarketState { &mut self.state }

    pub fn action_space(&self) -> &ActionSpace { &self.action_space }
    pub fn observation_space(&self) -> &BoxSpace { &self.observation_space }
    pub fn number_of_vendors(&self) -> usize { self.competitors.len() + 1 }
    pub fn competitors(&self) -> impl Iterator<Item = &dyn Vendor> { self.competitors.iter().map(|c| c.as_ref()) }

    /// Number of distinct discrete actions, `None` for continuous markets.
    pub fn get_n_actions(&self) -> Option<u64> { self.action_space.n_actions() }

    pub fn get_observations_dimension(&self) -> usize { self.observation_space.shape() }

    /// Number of prices in one action.
    pub fn get_actions_dimension(&self) -> usize { self.action_space.dimension() }

    /// The market as seen by vendor `view`.
    pub fn observation(&self, view: usize) -> Result<Observation> {
        if view >= self.number_of_vendors() {
            return Err(MarketError::InvalidObservation(format!(
                "vendor {view} does not exist in a market of {}",
                self.number_of_vendors()
            )));
        }
        let observation = self.layout.build(&self.state, view);
        if !self.observation_space.contains_slice(&observation) {
            return Err(MarketError::InvalidObservation(format!(
                "{observation:?} lies outside the observation space"
            )));
        }
        Ok(observation)
    }

    /// Play one episode with `agent` as vendor 0.
    pub fn run_episode(&mut self, agent: &mut dyn Vendor, seed: Option<u64>) -> Result<EpisodeSummary> {
        let mut observation = self.reset(seed)?;
        let mut summary = EpisodeSummary::default();
        loop {
            let action = agent.policy(&observation)?;
            let step = self.step(action)?;
            summary.rewards.push(step.reward);
            summary.infos.push(step.info);
            observation = step.observation;
            if step.done {
                return Ok(summary);
            }
        }
    }

    /// Prices every vendor starts an episode with, kept inside the action space.
    fn initial_action(&self) -> Action {
        let top = self.config.max_price - 1;
        let production = self.config.production_price;
        let above_production = (production + 1).min(top);
        match self.economy {
            Economy::Linear => Action::linear(above_production),
            Economy::Circular => Action::circular(production, above_production),
            Economy::CircularRebuy => Action::rebuy(production, above_production, 1.min(top)),
        }
    }

    fn reset_state(&mut self) -> Result<()> {
        let n = self.number_of_vendors();
        let max_storage = self.config.max_storage;
        let in_circulation = if self.economy.is_circular() { self.rng.gen_range(0..5 * max_storage) } else { 0 };
        let vendors = match self.economy {
            Economy::Linear => {
                let max_quality = f64::from(self.config.max_quality);
                let quality = Normal::new(max_quality / 2.0, 2.0 * max_quality / 5.0)
                    .map_err(|e| MarketError::Config(format!("quality distribution: {e}")))?;
                (0..n)
                    .map(|_| VendorState {
                        in_storage: 0,
                        quality: (quality.sample(&mut self.rng) as i64).clamp(1, i64::from(self.config.max_quality)) as u32,
                    })
                    .collect()
            }
            Economy::Circular | Economy::CircularRebuy => (0..n)
                .map(|_| VendorState { in_storage: self.rng.gen_range(0..max_storage), quality: 0 })
                .collect(),
        };
        self.state = MarketState {
            step_counter: 0,
            in_circulation,
            vendors,
            actions: vec![self.initial_action(); n],
        };
        Ok(())
    }

    fn check_competitor_action(&self, competitor: usize, action: Action) -> Result<Action> {
        if self.action_space.contains(&action) {
            return Ok(action);
        }
        if self.action_space.is_continuous() {
            let clipped = self.action_space.clip(&action);
            if self.action_space.contains(&clipped) {
                warn!(
                    "competitor {} proposed {:?}, clamped to {:?}",
                    self.competitors[competitor].name(),
                    action.prices(),
                    clipped.prices()
                );
                return Ok(clipped);
            }
        }
        Err(MarketError::InvalidAction(format!(
            "competitor {} proposed {:?} which is not a valid action",
            self.competitors[competitor].name(),
            action.prices()
        )))
    }

    fn simulate_customers(&mut self, profits: &mut [f64], info: &mut StepInfo, customers: u32) -> Result<()> {
        let n = self.number_of_vendors();
        let probabilities = self.customer.purchase_probabilities(&self.config, &self.state);
        let expected = self.economy.customer_outcomes(n);
        if probabilities.len() != expected {
            return Err(MarketError::DistributionLength { expected, actual: probabilities.len() });
        }
        let decisions = multinomial(&mut self.rng, u64::from(customers), &probabilities);
        info.buy_nothing += decisions[0];
        info.incoming += u64::from(customers);

        for (choice, &frequency) in decisions.iter().enumerate().skip(1) {
            if frequency == 0 {
                continue;
            }
            match &mut info.details {
                EconomyInfo::Circular(details) => self.complete_circular_purchase(profits, details, choice - 1, frequency)?,
                EconomyInfo::Linear(details) => self.complete_linear_purchase(profits, details, choice - 1, frequency),
            }
        }
        Ok(())
    }

    /// `offer` is `2 * vendor` for refurbished and `2 * vendor + 1` for new products.
    fn complete_circular_purchase(
        &mut self,
        profits: &mut [f64],
        info: &mut CircularInfo,
        offer: usize,
        frequency: u64,
    ) -> Result<()> {
        let vendor = offer / 2;
        let action = &self.state.actions[vendor];
        if offer % 2 == 0 {
            let price = f64::from(action.price_refurbished());
            let storage = &mut self.state.vendors[vendor].in_storage;
            let sold = frequency.min(u64::from(*storage));
            *storage = storage
                .checked_sub(sold as u32)
                .ok_or_else(|| MarketError::Invariant(format!("storage of vendor {vendor} would become negative")))?;
            let unmet = frequency - sold;
            let penalty = self.config.stockout_penalty_factor * f64::from(self.config.max_price) * unmet as f64;
            let profit = sold as f64 * price - penalty;
            profits[vendor] += profit;
            info.purchases_refurbished[vendor] += sold;
            info.unmet_refurbished[vendor] += unmet;
            info.by_selling_refurbished[vendor] += profit;
        } else {
            let profit = frequency as f64 * (f64::from(action.price_new()) - f64::from(self.config.production_price));
            profits[vendor] += profit;
            info.purchases_new[vendor] += frequency;
            info.by_selling_new[vendor] += profit;
            let circulation = u64::from(self.state.in_circulation) + frequency;
            self.state.in_circulation = circulation.min(u64::from(self.config.max_circulation())) as u32;
        }
        Ok(())
    }

    fn complete_linear_purchase(&mut self, profits: &mut [f64], info: &mut LinearInfo, vendor: usize, frequency: u64) {
        let price = f64::from(self.state.actions[vendor].price());
        profits[vendor] += frequency as f64 * (price - f64::from(self.config.production_price));
        info.purchases[vendor] += frequency;
    }

    fn simulate_owners(&mut self, profits: &mut [f64], info: &mut StepInfo) -> Result<()> {
        let Some(owner) = self.owner.as_ref() else {
            return Ok(());
        };
        let n = self.number_of_vendors();
        let probabilities = owner.return_probabilities(&self.config, &self.state);
        let expected = self.economy.owner_outcomes(n);
        if probabilities.len() != expected {
            return Err(MarketError::DistributionLength { expected, actual: probabilities.len() });
        }
        let owners = (self.config.owner_rate * f64::from(self.state.in_circulation) / n as f64) as u64;
        let decisions = multinomial(&mut self.rng, owners, &probabilities);
        let EconomyInfo::Circular(details) = &mut info.details else {
            return Err(MarketError::Invariant("owners only exist in circular markets".into()));
        };

        self.remove_from_circulation(decisions[1])?;
        details.throw_away += decisions[1];

        for (vendor, &frequency) in decisions[2..].iter().enumerate() {
            if frequency == 0 {
                continue;
            }
            let rebuy_price = if self.economy.has_rebuy_price() {
                f64::from(self.state.actions[vendor].price_rebuy())
            } else {
                0.0
            };
            // Products beyond max_storage are discarded but still paid for.
            let storage = &mut self.state.vendors[vendor].in_storage;
            *storage = (u64::from(*storage) + frequency).min(u64::from(self.config.max_storage)) as u32;
            self.remove_from_circulation(frequency)?;
            let cost = frequency as f64 * rebuy_price;
            details.rebuys[vendor] += frequency;
            details.rebuy_cost[vendor] -= cost;
            profits[vendor] -= cost;
        }
        Ok(())
    }

    fn remove_from_circulation(&mut self, count: u64) -> Result<()> {
        self.state.in_circulation = u32::try_from(count)
            .ok()
            .and_then(|count| self.state.in_circulation.checked_sub(count))
            .ok_or_else(|| MarketError::Invariant("more products left circulation than were in it".into()))?;
        Ok(())
    }

    fn consider_storage_costs(&self, profits: &mut [f64], info: &mut StepInfo) {
        let Some(details) = info.circular_mut() else {
            return;
        };
        for (vendor, state) in self.state.vendors.iter().enumerate() {
            let cost = f64::from(state.in_storage) * self.config.storage_cost_per_product;
            profits[vendor] -= cost;
            details.storage_cost[vendor] = -cost;
        }
    }

    /// Own profit, or `2 * own - max(competitors)` with the mixed reward.
    pub fn reward(&self, profits: &[f64]) -> f64 {
        match profits.split_first() {
            Some((own, others)) if self.config.reward_mixed_profit_and_difference && !others.is_empty() => {
                2.0 * own - others.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            }
            Some((own, _)) => *own,
            None => 0.0,
        }
    }
}

impl Env for SimMarket {
    type Obs = Observation;
    type Act = Action;
    type Info = StepInfo;

    fn reset(&mut self, seed: Option<u64>) -> Result<Observation> {
        if let Some(seed) = seed {
            self.seed(seed);
        }
        self.reset_state()?;
        debug!(
            "reset {} market: in_circulation={}, vendors={:?}",
            self.scenario, self.state.in_circulation, self.state.vendors
        );
        self.observation(0)
    }

    fn step(&mut self, action: Action) -> Result<Step<Observation, StepInfo>> {
        if self.state.step_counter >= self.config.episode_length {
            return Err(MarketError::Invariant("the episode is over, reset the market first".into()));
        }
        if !self.action_space.contains(&action) {
            return Err(MarketError::InvalidAction(format!(
                "{:?} is not in the action space of a {} market",
                action.prices(),
                self.economy
            )));
        }
        self.state.actions[0] = action;
        self.state.step_counter += 1;

        let n = self.number_of_vendors();
        let mut profits = vec![0.0; n];
        let mut info = StepInfo::new(self.economy, &self.state);

        let customers_per_slot = self.config.number_of_customers / n as u32;
        for slot in 0..n {
            self.simulate_customers(&mut profits, &mut info, customers_per_slot)?;
            self.simulate_owners(&mut profits, &mut info)?;
            if slot + 1 < n {
                let observation = self.observation(slot + 1)?;
                let proposed = self.competitors[slot].policy(&observation)?;
                let action = self.check_competitor_action(slot, proposed)?;
                self.state.actions[slot + 1] = action;
            }
        }

        self.consider_storage_costs(&mut profits, &mut info);
        let reward = self.reward(&profits);
        info.profits_all = profits;
        let done = self.state.step_counter >= self.config.episode_length;
        trace!(
            "step {} of {}: reward={reward:.2}, profits={:?}",
            self.state.step_counter, self.scenario, info.profits_all
        );
        if done {
            debug!("{} episode finished after {} steps", self.scenario, self.state.step_counter);
        }
        Ok(Step::new(self.observation(0)?, reward, done, info))
    }
}
