// Registration of market ids
//! Global registry constructing markets and vendors from string ids.
//!
//! Every [`Scenario`] is registered under its kebab-case name
//! (`circular-rebuy-duopoly`, ...) the first time the registry is used.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

use log::debug;
use strum::IntoEnumIterator;

use crate::core::{MarketError, Result};
use crate::market::{Config, Economy, Scenario, SimMarket};
use crate::vendors::{Vendor, VendorKind};

/// Key-value kwargs for make_from_kwargs(). Stringly-typed values.
pub type KwArgs = HashMap<String, String>;

/// Market specification metadata.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketSpec {
    /// Unique identifier like "circular-duopoly".
    pub id: String,
    pub scenario: Scenario,
    /// Fixed number of competitors, `None` for open line-ups.
    pub number_of_competitors: Option<usize>,
}

impl MarketSpec {
    pub fn new<S: Into<String>>(id: S, scenario: Scenario) -> Self {
        Self { id: id.into(), scenario, number_of_competitors: scenario.get_num_competitors() }
    }

    pub fn economy(&self) -> Economy { self.scenario.economy() }
}

/// Factory closure type constructing a market from a config.
pub type MarketFactory = Box<dyn Fn(Config) -> Result<SimMarket> + Send + Sync>;

#[derive(Default)]
struct RegistryInner {
    specs: HashMap<String, MarketSpec>,
    factories: HashMap<String, MarketFactory>,
}

struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    fn with_builtins() -> Self {
        let mut inner = RegistryInner::default();
        for scenario in Scenario::iter() {
            let spec = MarketSpec::new(scenario.to_string(), scenario);
            inner.factories.insert(spec.id.clone(), Box::new(move |config: Config| SimMarket::new(scenario, config)));
            inner.specs.insert(spec.id.clone(), spec);
        }
        Self { inner: RwLock::new(inner) }
    }

    fn register(&self, spec: MarketSpec, factory: MarketFactory) -> Result<()> {
        let mut g = self.inner.write().map_err(|_| MarketError::Other("registry poisoned".into()))?;
        if g.specs.contains_key(&spec.id) {
            return Err(MarketError::Other(format!("market id already registered: {}", spec.id)));
        }
        debug!("registering market {}", spec.id);
        g.factories.insert(spec.id.clone(), factory);
        g.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    fn get_spec(&self, id: &str) -> Option<MarketSpec> {
        let g = self.inner.read().ok()?;
        g.specs.get(id).cloned()
    }

    fn ids(&self) -> Vec<String> {
        let Ok(g) = self.inner.read() else {
            return Vec::new();
        };
        let mut ids: Vec<String> = g.specs.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn make(&self, id: &str, config: Config) -> Result<SimMarket> {
        let guard = self.inner.read().map_err(|_| MarketError::Other("registry poisoned".into()))?;
        match guard.factories.get(id) {
            Some(f) => f(config),
            None => Err(MarketError::UnknownId(format!("market {id}"))),
        }
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry { REGISTRY.get_or_init(Registry::with_builtins) }

/// Register a market spec and its factory globally.
pub fn register(spec: MarketSpec, factory: MarketFactory) -> Result<()> { registry().register(spec, factory) }

/// Fetch a registered MarketSpec by id.
pub fn get_spec(id: &str) -> Option<MarketSpec> { registry().get_spec(id) }

/// All registered market ids, sorted.
pub fn registered_ids() -> Vec<String> { registry().ids() }

/// Construct a market by id.
pub fn make<S: AsRef<str>>(id: S, config: Config) -> Result<SimMarket> { registry().make(id.as_ref(), config) }

/// Construct a market by id from string key/values; every config field
/// must be present.
pub fn make_from_kwargs<S: AsRef<str>>(id: S, kwargs: &KwArgs) -> Result<SimMarket> {
    let config = Config::from_kwargs(kwargs)?;
    make(id, config)
}

/// Construct a built-in vendor by its kebab-case id.
pub fn make_vendor(id: &str, config: &Config, economy: Economy) -> Result<Box<dyn Vendor>> {
    let kind = VendorKind::from_str(id).map_err(|_| MarketError::UnknownId(format!("vendor {id}")))?;
    kind.build(config, economy)
}
