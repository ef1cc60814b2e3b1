pub mod core;
pub mod spaces;
pub mod utils;
pub mod market;
pub mod vendors;
pub mod watcher;
pub mod registry;
pub mod wrappers;
pub mod vector;

pub use crate::core::{Env, Info, InfoValue, MarketError, Result, Step};
pub use crate::spaces::{BoxSpace, Discrete, MultiDiscrete, Space};
pub use crate::market::{Action, ActionSpace, Config, Economy, Observation, Scenario, SimMarket, StepInfo};
pub use crate::vendors::{Vendor, VendorKind};
pub use crate::watcher::Watcher;
pub use crate::registry::{make, make_from_kwargs, make_vendor, KwArgs, MarketSpec};
pub use crate::wrappers::{ClipAction, Watched};
pub use crate::vector::SyncVectorEnv;

#[cfg(test)]
mod tests {
    use super::*;

    /// A tiny counting environment to validate the trait contract.
    struct CounterEnv {
        state: i32,
    }

    impl Env for CounterEnv {
        type Obs = i32;
        type Act = i32;
        type Info = Info;

        fn reset(&mut self, _seed: Option<u64>) -> Result<Self::Obs> {
            self.state = 0;
            Ok(self.state)
        }

        fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs, Self::Info>> {
            self.state += action;
            let mut info = Info::new();
            info.insert("state/counter", i64::from(self.state).into());
            Ok(Step::new(self.state, 1.0, self.state >= 3, info))
        }
    }

    #[test]
    fn dummy_env_runs() {
        let mut env = CounterEnv { state: 0 };
        assert_eq!(env.reset(None).expect("reset"), 0);
        let s1 = env.step(1).expect("step");
        assert_eq!(s1.observation, 1);
        assert!(!s1.done);
        let s2 = env.step(2).expect("step");
        assert!(s2.done);
        assert_eq!(s2.info.get("state/counter").and_then(InfoValue::as_f64), Some(3.0));
        env.close();
    }

    #[test]
    fn watched_counter_feeds_the_watcher() {
        let mut env = Watched::new(CounterEnv { state: 0 }, Watcher::new(2, 1));
        env.reset(None).expect("reset");
        env.step(1).expect("step");
        env.step(1).expect("step");
        assert_eq!(env.watcher().get_all_samples_of_property("state/counter", None).expect("recorded"), vec![3.0]);
    }

    #[test]
    fn every_scenario_resets_into_its_observation_space() {
        use strum::IntoEnumIterator;
        for scenario in Scenario::iter() {
            let mut market = make(scenario.to_string(), Config::default()).expect("built-in scenario");
            let observation = market.reset(Some(11)).expect("reset");
            assert!(market.observation_space().contains(&observation), "{scenario}");
            assert_eq!(observation.len(), market.get_observations_dimension());
        }
    }
}
