use std::io::{self, BufRead, Stdout, StdinLock, Write};

use crate::core::{MarketError, Result};
use crate::market::action::Action;
use crate::market::scenario::Economy;
use crate::vendors::Vendor;

/// A person typing prices, one whitespace-separated line per step.
pub struct HumanVendor<R, W> {
    economy: Economy,
    input: R,
    output: W,
}

impl HumanVendor<StdinLock<'static>, Stdout> {
    pub fn stdio(economy: Economy) -> Self { Self::new(economy, io::stdin().lock(), io::stdout()) }
}

impl<R: BufRead, W: Write> HumanVendor<R, W> {
    pub fn new(economy: Economy, input: R, output: W) -> Self { Self { economy, input, output } }

    fn read_prices(&mut self) -> Result<Vec<u32>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| MarketError::Input(format!("could not read prices: {e}")))?;
        if read == 0 {
            return Err(MarketError::Input("input closed before prices were entered".into()));
        }
        let prices = line
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<u32>()
                    .map_err(|_| MarketError::Input(format!("{token} is not a price")))
            })
            .collect::<Result<Vec<_>>>()?;
        let expected = self.economy.price_dimensions();
        if prices.len() != expected {
            return Err(MarketError::Input(format!(
                "please enter {expected} numbers separated by spaces, got {}",
                prices.len()
            )));
        }
        Ok(prices)
    }
}

impl<R: BufRead, W: Write> Vendor for HumanVendor<R, W> {
    fn name(&self) -> &str { "human" }

    fn policy(&mut self, observation: &[f32]) -> Result<Action> {
        writeln!(
            self.output,
            "The observation is {observation:?}. Enter {} price(s) separated by spaces:",
            self.economy.price_dimensions()
        )
        .and_then(|_| self.output.flush())
        .map_err(|e| MarketError::Input(format!("could not write prompt: {e}")))?;
        let prices = self.read_prices()?;
        Ok(Action::continuous(prices.into_iter().map(|p| p as f32).collect()))
    }
}
