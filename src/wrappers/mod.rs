// Wrappers composing around a market.
//
// - ClipAction: clamps continuous prices into the action box
// - Watched: feeds every step's info into a Watcher

use crate::core::{Env, Info, Result, Step};
use crate::market::action::{Action, ActionSpace};
use crate::market::sim_market::SimMarket;
use crate::watcher::Watcher;

/// Clamps every action into the given action space before stepping.
/// Discrete actions pass through unchanged.
pub struct ClipAction<E: Env<Act = Action>> {
    inner: E,
    space: ActionSpace,
}

impl<E: Env<Act = Action>> ClipAction<E> {
    pub fn new(inner: E, space: ActionSpace) -> Self { Self { inner, space } }

    pub fn inner(&self) -> &E { &self.inner }
    pub fn inner_mut(&mut self) -> &mut E { &mut self.inner }
    pub fn into_inner(self) -> E { self.inner }
}

impl ClipAction<SimMarket> {
    /// Clip into the market's own action space.
    pub fn for_market(market: SimMarket) -> Self {
        let space = market.action_space().clone();
        Self::new(market, space)
    }
}

impl<E: Env<Act = Action>> Env for ClipAction<E> {
    type Obs = E::Obs;
    type Act = Action;
    type Info = E::Info;

    fn reset(&mut self, seed: Option<u64>) -> Result<Self::Obs> { self.inner.reset(seed) }

    fn step(&mut self, action: Action) -> Result<Step<Self::Obs, Self::Info>> {
        let clipped = self.space.clip(&action);
        self.inner.step(clipped)
    }

    fn close(&mut self) { self.inner.close() }
}

/// Records every step of the inner environment in a [`Watcher`] under a
/// fixed env index.
pub struct Watched<E: Env> {
    inner: E,
    watcher: Watcher,
    env_index: usize,
}

impl<E> Watched<E>
where
    E: Env,
    for<'a> &'a E::Info: Into<Info>,
{
    pub fn new(inner: E, watcher: Watcher) -> Self { Self::with_index(inner, watcher, 0) }

    pub fn with_index(inner: E, watcher: Watcher, env_index: usize) -> Self { Self { inner, watcher, env_index } }

    pub fn watcher(&self) -> &Watcher { &self.watcher }
    pub fn inner(&self) -> &E { &self.inner }
    pub fn inner_mut(&mut self) -> &mut E { &mut self.inner }

    pub fn into_parts(self) -> (E, Watcher) { (self.inner, self.watcher) }
}

impl<E> Env for Watched<E>
where
    E: Env,
    for<'a> &'a E::Info: Into<Info>,
{
    type Obs = E::Obs;
    type Act = E::Act;
    type Info = E::Info;

    /// An episode cut short by the reset is not recorded.
    fn reset(&mut self, seed: Option<u64>) -> Result<Self::Obs> {
        self.watcher.discard_episode(self.env_index)?;
        self.inner.reset(seed)
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs, Self::Info>> {
        let step = self.inner.step(action)?;
        self.watcher.add_info(&step.info, self.env_index)?;
        Ok(step)
    }

    fn close(&mut self) { self.inner.close() }
}
