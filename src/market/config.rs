//! Simulation parameters shared by a market, its customers, owners and vendors.

use std::str::FromStr;

use crate::core::{MarketError, Result};
use crate::registry::KwArgs;

/// Immutable bundle of market parameters.
///
/// Prices live in `[0, max_price - 1]`; customers and owners see them shifted
/// by one so that a price of zero never divides by zero.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub max_storage: u32,
    pub episode_length: u32,
    pub max_price: u32,
    pub max_quality: u32,
    /// Customers per step; split into one equal batch per vendor.
    pub number_of_customers: u32,
    pub production_price: u32,
    pub storage_cost_per_product: f64,
    pub common_state_visibility: bool,
    pub opposite_own_state_visibility: bool,
    /// Reward `2 * own_profit - max(competitor_profits)` instead of own profit.
    pub reward_mixed_profit_and_difference: bool,
    pub support_continuous_action_space: bool,
    /// Per unmet refurbished unit, the vendor loses `factor * max_price`.
    pub stockout_penalty_factor: f64,
    /// Share of the products in circulation whose owners decide per step.
    pub owner_rate: f64,
    pub compared_value_old: f64,
    pub upper_tolerance_old: f64,
    pub upper_tolerance_new: f64,
    /// Adds a sinusoidal demand term to linear customers.
    pub seasonal_customers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_storage: 100,
            episode_length: 50,
            max_price: 10,
            max_quality: 50,
            number_of_customers: 20,
            production_price: 3,
            storage_cost_per_product: 0.1,
            common_state_visibility: true,
            opposite_own_state_visibility: true,
            reward_mixed_profit_and_difference: false,
            support_continuous_action_space: false,
            stockout_penalty_factor: 2.0,
            owner_rate: 0.05,
            compared_value_old: 0.55,
            upper_tolerance_old: 5.0,
            upper_tolerance_new: 8.0,
            seasonal_customers: false,
        }
    }
}

/// Type of a configurable field, as reported to configuration front-ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Bool,
}

/// Range rule attached to a numeric field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    GreaterZero,
    NonNegative,
    GreaterZeroEven,
}

impl Rule {
    pub fn check(self, value: f64) -> bool {
        match self {
            Rule::GreaterZero => value > 0.0,
            Rule::NonNegative => value >= 0.0,
            Rule::GreaterZeroEven => value > 0.0 && value.fract() == 0.0 && (value as u64) % 2 == 0,
        }
    }

    pub fn message(self, field: &str) -> String {
        match self {
            Rule::GreaterZero => format!("{field} should be positive"),
            Rule::NonNegative => format!("{field} should be non-negative"),
            Rule::GreaterZeroEven => format!("{field} should be even and positive"),
        }
    }
}

/// A field a market scenario reads from its [`Config`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigurableField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub rule: Option<Rule>,
}

impl ConfigurableField {
    pub const fn new(name: &'static str, kind: FieldKind, rule: Option<Rule>) -> Self {
        Self { name, kind, rule }
    }
}

/// Largest accepted `max_storage`; owners hold up to ten times as much.
pub const STORAGE_LIMIT: u32 = 100_000_000;
/// Largest accepted `max_price`; a rebuy action space has `max_price^3` elements.
pub const PRICE_LIMIT: u32 = 1_000_000;

/// Fields every market needs.
pub const BASE_FIELDS: [ConfigurableField; 7] = [
    ConfigurableField::new("max_storage", FieldKind::Int, Some(Rule::GreaterZero)),
    ConfigurableField::new("episode_length", FieldKind::Int, Some(Rule::GreaterZero)),
    ConfigurableField::new("max_price", FieldKind::Int, Some(Rule::GreaterZero)),
    ConfigurableField::new("max_quality", FieldKind::Int, Some(Rule::GreaterZero)),
    ConfigurableField::new("number_of_customers", FieldKind::Int, Some(Rule::GreaterZeroEven)),
    ConfigurableField::new("production_price", FieldKind::Int, Some(Rule::NonNegative)),
    ConfigurableField::new("storage_cost_per_product", FieldKind::Float, Some(Rule::NonNegative)),
];

/// Visibility and reward switches.
pub const FLAG_FIELDS: [ConfigurableField; 4] = [
    ConfigurableField::new("common_state_visibility", FieldKind::Bool, None),
    ConfigurableField::new("opposite_own_state_visibility", FieldKind::Bool, None),
    ConfigurableField::new("reward_mixed_profit_and_difference", FieldKind::Bool, None),
    ConfigurableField::new("support_continuous_action_space", FieldKind::Bool, None),
];

/// Model constants with defaults; optional in `from_kwargs`.
pub const TUNABLE_FIELDS: [ConfigurableField; 6] = [
    ConfigurableField::new("stockout_penalty_factor", FieldKind::Float, Some(Rule::NonNegative)),
    ConfigurableField::new("owner_rate", FieldKind::Float, Some(Rule::NonNegative)),
    ConfigurableField::new("compared_value_old", FieldKind::Float, Some(Rule::NonNegative)),
    ConfigurableField::new("upper_tolerance_old", FieldKind::Float, None),
    ConfigurableField::new("upper_tolerance_new", FieldKind::Float, None),
    ConfigurableField::new("seasonal_customers", FieldKind::Bool, None),
];

impl Config {
    /// Upper bound of products held by owners.
    pub fn max_circulation(&self) -> u32 { 10 * self.max_storage }

    /// Check every range rule and the cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let numeric = [
            ("max_storage", self.max_storage as f64),
            ("episode_length", self.episode_length as f64),
            ("max_price", self.max_price as f64),
            ("max_quality", self.max_quality as f64),
            ("number_of_customers", self.number_of_customers as f64),
            ("production_price", self.production_price as f64),
            ("storage_cost_per_product", self.storage_cost_per_product),
            ("stockout_penalty_factor", self.stockout_penalty_factor),
            ("owner_rate", self.owner_rate),
            ("compared_value_old", self.compared_value_old),
        ];
        for (name, value) in numeric {
            if !value.is_finite() {
                return Err(MarketError::Config(format!("{name} must be finite")));
            }
            let field = BASE_FIELDS.iter().chain(TUNABLE_FIELDS.iter()).find(|f| f.name == name);
            if let Some(rule) = field.and_then(|f| f.rule) {
                if !rule.check(value) {
                    return Err(MarketError::Config(rule.message(name)));
                }
            }
        }
        if self.max_storage > STORAGE_LIMIT {
            return Err(MarketError::Config(format!("max_storage must not exceed {STORAGE_LIMIT}")));
        }
        if self.max_price > PRICE_LIMIT {
            return Err(MarketError::Config(format!("max_price must not exceed {PRICE_LIMIT}")));
        }
        if self.owner_rate > 1.0 {
            return Err(MarketError::Config("owner_rate is a share and must not exceed 1".into()));
        }
        if self.production_price >= self.max_price {
            return Err(MarketError::Config(format!(
                "production_price ({}) must be lower than max_price ({})",
                self.production_price, self.max_price
            )));
        }
        if !self.upper_tolerance_old.is_finite() || !self.upper_tolerance_new.is_finite() {
            return Err(MarketError::Config("customer tolerances must be finite".into()));
        }
        Ok(())
    }

    /// Build a config from string key/values.
    ///
    /// Every base and flag field must be present; tunables fall back to their
    /// defaults. Unknown keys are rejected so that typos fail loudly.
    pub fn from_kwargs(kwargs: &KwArgs) -> Result<Self> {
        for key in kwargs.keys() {
            let known = BASE_FIELDS.iter().chain(FLAG_FIELDS.iter()).chain(TUNABLE_FIELDS.iter()).any(|f| f.name == key);
            if !known {
                return Err(MarketError::Config(format!("unknown field {key}")));
            }
        }

        let defaults = Config::default();
        let config = Config {
            max_storage: required(kwargs, "max_storage")?,
            episode_length: required(kwargs, "episode_length")?,
            max_price: required(kwargs, "max_price")?,
            max_quality: required(kwargs, "max_quality")?,
            number_of_customers: required(kwargs, "number_of_customers")?,
            production_price: required(kwargs, "production_price")?,
            storage_cost_per_product: required(kwargs, "storage_cost_per_product")?,
            common_state_visibility: required(kwargs, "common_state_visibility")?,
            opposite_own_state_visibility: required(kwargs, "opposite_own_state_visibility")?,
            reward_mixed_profit_and_difference: required(kwargs, "reward_mixed_profit_and_difference")?,
            support_continuous_action_space: required(kwargs, "support_continuous_action_space")?,
            stockout_penalty_factor: optional(kwargs, "stockout_penalty_factor", defaults.stockout_penalty_factor)?,
            owner_rate: optional(kwargs, "owner_rate", defaults.owner_rate)?,
            compared_value_old: optional(kwargs, "compared_value_old", defaults.compared_value_old)?,
            upper_tolerance_old: optional(kwargs, "upper_tolerance_old", defaults.upper_tolerance_old)?,
            upper_tolerance_new: optional(kwargs, "upper_tolerance_new", defaults.upper_tolerance_new)?,
            seasonal_customers: optional(kwargs, "seasonal_customers", defaults.seasonal_customers)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| MarketError::Config(format!("{name} has an invalid value: {raw}")))
}

fn required<T: FromStr>(kwargs: &KwArgs, name: &str) -> Result<T> {
    let raw = kwargs
        .get(name)
        .ok_or_else(|| MarketError::Config(format!("your config is missing {name}")))?;
    parse(name, raw)
}

fn optional<T: FromStr>(kwargs: &KwArgs, name: &str, default: T) -> Result<T> {
    match kwargs.get(name) {
        Some(raw) => parse(name, raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_kwargs() -> KwArgs {
        [
            ("max_storage", "100"),
            ("episode_length", "50"),
            ("max_price", "10"),
            ("max_quality", "50"),
            ("number_of_customers", "20"),
            ("production_price", "3"),
            ("storage_cost_per_product", "0.1"),
            ("common_state_visibility", "true"),
            ("opposite_own_state_visibility", "true"),
            ("reward_mixed_profit_and_difference", "false"),
            ("support_continuous_action_space", "false"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.max_circulation(), 1000);
    }

    #[test]
    fn kwargs_round_trip_to_defaults() {
        let config = Config::from_kwargs(&full_kwargs()).expect("complete kwargs");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_field_is_a_config_error() {
        let mut kwargs = full_kwargs();
        kwargs.remove("max_price");
        match Config::from_kwargs(&kwargs) {
            Err(MarketError::Config(msg)) => assert!(msg.contains("max_price")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_and_unparsable_fields_are_rejected() {
        let mut kwargs = full_kwargs();
        kwargs.insert("max_prize".into(), "10".into());
        assert!(matches!(Config::from_kwargs(&kwargs), Err(MarketError::Config(_))));

        let mut kwargs = full_kwargs();
        kwargs.insert("episode_length".into(), "fifty".into());
        assert!(matches!(Config::from_kwargs(&kwargs), Err(MarketError::Config(_))));
    }

    #[test]
    fn tunables_are_optional_overrides() {
        let mut kwargs = full_kwargs();
        kwargs.insert("owner_rate".into(), "0.1".into());
        let config = Config::from_kwargs(&kwargs).expect("valid override");
        assert_eq!(config.owner_rate, 0.1);
        assert_eq!(config.stockout_penalty_factor, 2.0);
    }

    #[test]
    fn range_rules_are_enforced() {
        let odd = Config { number_of_customers: 21, ..Config::default() };
        assert!(matches!(odd.validate(), Err(MarketError::Config(_))));

        let no_storage = Config { max_storage: 0, ..Config::default() };
        assert!(matches!(no_storage.validate(), Err(MarketError::Config(_))));

        let too_expensive = Config { production_price: 10, ..Config::default() };
        assert!(matches!(too_expensive.validate(), Err(MarketError::Config(_))));

        let negative_cost = Config { storage_cost_per_product: -0.5, ..Config::default() };
        assert!(matches!(negative_cost.validate(), Err(MarketError::Config(_))));
    }

    #[test]
    fn sizes_beyond_the_limits_are_rejected() {
        let huge_storage = Config { max_storage: 500_000_000, ..Config::default() };
        assert!(matches!(huge_storage.validate(), Err(MarketError::Config(_))));

        let huge_price = Config { max_price: PRICE_LIMIT + 1, ..Config::default() };
        assert!(matches!(huge_price.validate(), Err(MarketError::Config(_))));

        let every_owner_twice = Config { owner_rate: 2.0, ..Config::default() };
        assert!(matches!(every_owner_twice.validate(), Err(MarketError::Config(_))));

        let largest = Config { max_storage: STORAGE_LIMIT, max_price: PRICE_LIMIT, ..Config::default() };
        largest.validate().expect("limits are inclusive");
        assert_eq!(largest.max_circulation(), 10 * STORAGE_LIMIT);
    }
}
