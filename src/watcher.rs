//! Episode statistics collected from step infos.
//!
//! The watcher sums the infos of every step of an episode into one record
//! per episode. Several environments can feed the same watcher, each under
//! its own index; their episodes are appended in the order they finish.

use std::collections::BTreeMap;

use log::debug;

use crate::core::{Info, InfoValue, MarketError, Result};
use crate::market::config::Config;

/// Samples of one property across episodes.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertySamples {
    Scalar(Vec<f64>),
    /// One sample list per vendor.
    PerVendor(Vec<Vec<f64>>),
}

#[derive(Clone, Debug)]
pub struct Watcher {
    episode_length: u32,
    all_dicts: Vec<Info>,
    step_counters: Vec<u32>,
    accumulators: Vec<Option<Info>>,
}

/// Properties that describe a level rather than a flow; their episode sums
/// are divided by the episode length before use.
fn is_level_property(name: &str) -> bool { name.starts_with("state") || name.starts_with("actions") }

impl Watcher {
    pub fn new(episode_length: u32, number_envs: usize) -> Self {
        assert!(episode_length > 0, "episode_length must be positive");
        Self {
            episode_length,
            all_dicts: Vec::new(),
            step_counters: vec![0; number_envs],
            accumulators: vec![None; number_envs],
        }
    }

    pub fn from_config(config: &Config, number_envs: usize) -> Self { Self::new(config.episode_length, number_envs) }

    pub fn number_envs(&self) -> usize { self.step_counters.len() }
    pub fn episode_length(&self) -> u32 { self.episode_length }

    /// Finished episodes, oldest first.
    pub fn all_dicts(&self) -> &[Info] { &self.all_dicts }

    /// Add the info of one step taken in environment `env_index`. After
    /// `episode_length` calls the episode is complete.
    pub fn add_info(&mut self, info: impl Into<Info>, env_index: usize) -> Result<()> {
        if env_index >= self.number_envs() {
            return Err(MarketError::Input(format!(
                "env index {env_index} is out of range for {} environment(s)",
                self.number_envs()
            )));
        }
        let info = info.into();
        let accumulated = match &self.accumulators[env_index] {
            Some(sum) => sum.add(&info)?,
            None => info,
        };
        self.accumulators[env_index] = Some(accumulated);
        self.step_counters[env_index] += 1;
        if self.step_counters[env_index] == self.episode_length {
            self.finish_episode(env_index);
        }
        Ok(())
    }

    /// Drop the unfinished episode of `env_index`, e.g. when its environment
    /// is reset early. Finished episodes are kept.
    pub fn discard_episode(&mut self, env_index: usize) -> Result<()> {
        if env_index >= self.number_envs() {
            return Err(MarketError::Input(format!(
                "env index {env_index} is out of range for {} environment(s)",
                self.number_envs()
            )));
        }
        if self.step_counters[env_index] > 0 {
            debug!("env {env_index} discarded an episode after {} steps", self.step_counters[env_index]);
        }
        self.accumulators[env_index] = None;
        self.step_counters[env_index] = 0;
        Ok(())
    }

    fn finish_episode(&mut self, env_index: usize) {
        if let Some(episode) = self.accumulators[env_index].take() {
            self.all_dicts.push(episode);
        }
        self.step_counters[env_index] = 0;
        debug!("env {env_index} finished an episode, {} recorded", self.all_dicts.len());
    }

    /// Mean over the last `look_back` episodes; empty before the first one.
    pub fn get_average_dict(&self, look_back: usize) -> Result<Info> {
        let start = self.all_dicts.len().saturating_sub(look_back);
        let window = &self.all_dicts[start..];
        let Some((first, rest)) = window.split_first() else {
            return Ok(Info::new());
        };
        let mut sum = first.clone();
        for episode in rest {
            sum = sum.add(episode)?;
        }
        Ok(sum.divide(window.len() as f64))
    }

    fn sample(episode: &Info, name: &str, vendor: Option<usize>) -> Result<f64> {
        let value = episode
            .get(name)
            .ok_or_else(|| MarketError::UnknownId(format!("no property {name}")))?;
        let value = match vendor {
            Some(vendor) => value
                .vendor(vendor)
                .ok_or_else(|| MarketError::UnknownId(format!("{name} has no vendor_{vendor}")))?,
            None => value,
        };
        value
            .as_f64()
            .ok_or_else(|| MarketError::UnknownId(format!("{name} is recorded per vendor, pass a vendor")))
    }

    /// Episode sums of one property, in the order episodes finished.
    pub fn get_all_samples_of_property(&self, name: &str, vendor: Option<usize>) -> Result<Vec<f64>> {
        self.all_dicts.iter().map(|episode| Self::sample(episode, name, vendor)).collect()
    }

    /// Every flow property (not `state*` or `actions*`) as sample lists.
    pub fn get_cumulative_properties(&self) -> Result<BTreeMap<String, PropertySamples>> {
        let mut output = BTreeMap::new();
        let Some(first) = self.all_dicts.first() else {
            return Ok(output);
        };
        for (name, value) in first.iter() {
            if is_level_property(name) {
                continue;
            }
            let samples = match value {
                InfoValue::PerVendor(vendors) => PropertySamples::PerVendor(
                    (0..vendors.len())
                        .map(|vendor| self.get_all_samples_of_property(name, Some(vendor)))
                        .collect::<Result<_>>()?,
                ),
                _ => PropertySamples::Scalar(self.get_all_samples_of_property(name, None)?),
            };
            output.insert(name.to_string(), samples);
        }
        Ok(output)
    }

    /// Rolling means over `[max(i - look_back, 0), i]` for every episode `i`.
    /// Level properties are first turned into per-step averages.
    pub fn get_progress_values_of_property(&self, name: &str, vendor: Option<usize>, look_back: usize) -> Result<Vec<f64>> {
        let mut values = self.get_all_samples_of_property(name, vendor)?;
        if is_level_property(name) {
            let length = f64::from(self.episode_length);
            values.iter_mut().for_each(|v| *v /= length);
        }
        Ok((0..values.len())
            .map(|i| {
                let window = &values[i.saturating_sub(look_back)..=i];
                window.iter().sum::<f64>() / window.len() as f64
            })
            .collect())
    }

    /// Number of vendors in the recorded episodes, `None` before the first one.
    pub fn get_number_of_vendors(&self) -> Option<usize> {
        match self.all_dicts.first()?.get("profits/all")? {
            InfoValue::PerVendor(vendors) => Some(vendors.len()),
            _ => None,
        }
    }
}
