// Synchronous vector of independent markets.

use crate::core::{Env, Result, Step};
use crate::utils::rng::split_n;

/// Runs N copies of an environment in the current thread.
///
/// - Construct with `SyncVectorEnv::new(n, |i| make_market(i))`
/// - Reset all envs, optionally from one root seed: `reset_all(Some(0))`
/// - Step with a batch of actions: `step_all(actions)`
pub struct SyncVectorEnv<E: Env> {
    envs: Vec<E>,
}

impl<E: Env> SyncVectorEnv<E> {
    /// Create N environments; the factory receives the env index.
    pub fn new<F>(n: usize, factory: F) -> Result<Self>
    where
        F: FnMut(usize) -> Result<E>,
    {
        let envs = (0..n).map(factory).collect::<Result<Vec<_>>>()?;
        Ok(Self { envs })
    }

    pub fn from_envs(envs: Vec<E>) -> Self { Self { envs } }

    pub fn len(&self) -> usize { self.envs.len() }
    pub fn is_empty(&self) -> bool { self.envs.is_empty() }

    /// Reset all environments. With a root seed every env gets its own
    /// sub-seed, so the batch is reproducible without envs sharing streams.
    pub fn reset_all(&mut self, seed: Option<u64>) -> Result<Vec<E::Obs>> {
        let seeds: Vec<Option<u64>> = match seed {
            Some(root) => split_n(root, self.envs.len()).into_iter().map(Some).collect(),
            None => vec![None; self.envs.len()],
        };
        self.envs.iter_mut().zip(seeds).map(|(env, seed)| env.reset(seed)).collect()
    }

    /// Step every environment with its action. Stops at the first error.
    pub fn step_all(&mut self, actions: Vec<E::Act>) -> Result<Vec<Step<E::Obs, E::Info>>> {
        if actions.len() != self.envs.len() {
            return Err(crate::core::MarketError::InvalidAction(format!(
                "got {} actions for {} environments",
                actions.len(),
                self.envs.len()
            )));
        }
        self.envs.iter_mut().zip(actions).map(|(env, action)| env.step(action)).collect()
    }

    pub fn close_all(&mut self) {
        for env in &mut self.envs {
            env.close();
        }
    }

    pub fn envs(&self) -> &[E] { &self.envs }
    pub fn envs_mut(&mut self) -> &mut [E] { &mut self.envs }
}
