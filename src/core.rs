// Core traits and types shared by markets, vendors and the watcher.

/// A flat, ordered info map keyed by slash-separated property names
/// such as `profits/all` or `state/in_circulation`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Info {
    entries: Vec<(String, InfoValue)>,
}

impl Info {
    /// Create an empty Info map.
    pub fn new() -> Self { Self { entries: Vec::new() } }

    /// Insert or replace a key with the given value.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: InfoValue) {
        let k = key.into();
        if let Some((_, v)) = self.entries.iter_mut().find(|(kk, _)| kk == &k) {
            *v = value;
        } else {
            self.entries.push((k, value));
        }
    }

    /// Get a reference to a value by key.
    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Look up a full property path. A trailing `vendor_<i>` segment selects
    /// one vendor of a per-vendor entry, e.g. `profits/all/vendor_0`.
    pub fn lookup(&self, path: &str) -> Option<&InfoValue> {
        if let Some(value) = self.get(path) {
            return Some(value);
        }
        let (key, leaf) = path.rsplit_once('/')?;
        let vendor: usize = leaf.strip_prefix("vendor_")?.parse().ok()?;
        self.get(key)?.vendor(vendor)
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Number of entries.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Element-wise sum of two maps with the same shape.
    pub fn add(&self, other: &Info) -> Result<Info> {
        if self.len() != other.len() {
            return Err(MarketError::Other(format!(
                "cannot add info maps with {} and {} entries", self.len(), other.len()
            )));
        }
        let mut out = Info::new();
        for (key, value) in self.iter() {
            let rhs = other
                .get(key)
                .ok_or_else(|| MarketError::Other(format!("missing info key {key}")))?;
            out.insert(key, value.add(rhs)?);
        }
        Ok(out)
    }

    /// Divide every numeric leaf by `divisor`.
    pub fn divide(&self, divisor: f64) -> Info {
        Info {
            entries: self.entries.iter().map(|(k, v)| (k.clone(), v.divide(divisor))).collect(),
        }
    }
}

/// Values stored in an [`Info`] map. Per-vendor values are indexed by vendor
/// and rendered as `vendor_0..vendor_{N-1}` when flattened.
#[derive(Clone, Debug, PartialEq)]
pub enum InfoValue {
    I64(i64),
    F64(f64),
    PerVendor(Vec<InfoValue>),
}

impl InfoValue {
    /// Build a per-vendor value from any iterator of scalars.
    pub fn per_vendor<T: Into<InfoValue>, I: IntoIterator<Item = T>>(values: I) -> Self {
        InfoValue::PerVendor(values.into_iter().map(Into::into).collect())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            InfoValue::I64(v) => Some(*v as f64),
            InfoValue::F64(v) => Some(*v),
            InfoValue::PerVendor(_) => None,
        }
    }

    /// Value of a single vendor in a per-vendor entry.
    pub fn vendor(&self, vendor: usize) -> Option<&InfoValue> {
        match self {
            InfoValue::PerVendor(values) => values.get(vendor),
            _ => None,
        }
    }

    pub fn is_per_vendor(&self) -> bool { matches!(self, InfoValue::PerVendor(_)) }

    /// Element-wise sum; integers stay integers until mixed with floats.
    pub fn add(&self, other: &InfoValue) -> Result<InfoValue> {
        match (self, other) {
            (InfoValue::I64(a), InfoValue::I64(b)) => Ok(InfoValue::I64(a + b)),
            (InfoValue::PerVendor(a), InfoValue::PerVendor(b)) => {
                if a.len() != b.len() {
                    return Err(MarketError::Other(format!(
                        "per-vendor values differ in length: {} vs {}", a.len(), b.len()
                    )));
                }
                let summed = a.iter().zip(b.iter()).map(|(x, y)| x.add(y)).collect::<Result<Vec<_>>>()?;
                Ok(InfoValue::PerVendor(summed))
            }
            (InfoValue::PerVendor(_), _) | (_, InfoValue::PerVendor(_)) => {
                Err(MarketError::Other("cannot add a per-vendor value to a scalar".into()))
            }
            (a, b) => Ok(InfoValue::F64(a.as_f64().unwrap_or_default() + b.as_f64().unwrap_or_default())),
        }
    }

    pub fn divide(&self, divisor: f64) -> InfoValue {
        match self {
            InfoValue::PerVendor(values) => InfoValue::PerVendor(values.iter().map(|v| v.divide(divisor)).collect()),
            scalar => InfoValue::F64(scalar.as_f64().unwrap_or_default() / divisor),
        }
    }
}

impl From<&Info> for Info {
    fn from(info: &Info) -> Self { info.clone() }
}

impl From<i64> for InfoValue { fn from(v: i64) -> Self { InfoValue::I64(v) } }
impl From<i32> for InfoValue { fn from(v: i32) -> Self { InfoValue::I64(v as i64) } }
impl From<u32> for InfoValue { fn from(v: u32) -> Self { InfoValue::I64(v as i64) } }
impl From<u64> for InfoValue { fn from(v: u64) -> Self { InfoValue::I64(v as i64) } }
impl From<f64> for InfoValue { fn from(v: f64) -> Self { InfoValue::F64(v) } }
impl From<f32> for InfoValue { fn from(v: f32) -> Self { InfoValue::F64(v as f64) } }

/// A step result from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<Obs, I = Info> {
    pub observation: Obs,
    pub reward: f64,
    pub done: bool,
    pub info: I,
}

impl<Obs, I> Step<Obs, I> {
    pub fn new(observation: Obs, reward: f64, done: bool, info: I) -> Self {
        Self { observation, reward, done, info }
    }
}

/// Errors surfaced by markets, vendors and the watcher.
/// The core never recovers from them; they end the current episode.
#[derive(thiserror::Error, Debug)]
pub enum MarketError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),
    #[error("Probability distribution has length {actual}, expected {expected}")]
    DistributionLength { expected: usize, actual: usize },
    #[error("Invariant violated: {0}")]
    Invariant(String),
    #[error("Unknown id: {0}")]
    UnknownId(String),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Other error: {0}")]
    Other(String),
}

/// Convenience alias for results using MarketError.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Core environment trait following the Gym contract.
pub trait Env {
    type Obs;
    type Act;
    type Info;

    /// Reset the environment to an initial state.
    /// Implementations re-seed internal RNGs when `seed` is provided.
    fn reset(&mut self, seed: Option<u64>) -> Result<Self::Obs>;

    /// Apply an action and advance the environment by one step.
    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs, Self::Info>>;

    /// Release any external resources.
    fn close(&mut self) {}
}
