//! Money bookkeeping shared by the world and the economy systems.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a money operation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error, Serialize, Deserialize)]
pub enum EconomyError {
    /// Spending would drive the balance below zero.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Amount the operation attempted to spend.
        required: f64,
        /// Balance available when the operation was attempted.
        available: f64,
    },
    /// The amount was negative, NaN or infinite.
    #[error("invalid amount {0}")]
    InvalidAmount(f64),
}

/// Player economy: balance, passive income and the earnings multiplier.
///
/// `money` never drops below zero. Operations that would make it negative
/// fail and leave the state untouched.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    money: f64,
    money_per_second: f64,
    total_earnings: f64,
    multiplier: f64,
}

impl EconomyState {
    /// Creates a fresh economy holding `starting_money` with a unit multiplier.
    #[must_use]
    pub fn new(starting_money: f64) -> Self {
        Self {
            money: sanitize(starting_money),
            money_per_second: 0.0,
            total_earnings: 0.0,
            multiplier: 1.0,
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn money(&self) -> f64 {
        self.money
    }

    /// Passive income currently applied by the idle ticker.
    #[must_use]
    pub const fn money_per_second(&self) -> f64 {
        self.money_per_second
    }

    /// Sum of everything ever earned.
    #[must_use]
    pub const fn total_earnings(&self) -> f64 {
        self.total_earnings
    }

    /// Upgrade multiplier applied to yield.
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Credits `amount` to the balance and lifetime earnings.
    pub fn add_money(&mut self, amount: f64) -> Result<(), EconomyError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(EconomyError::InvalidAmount(amount));
        }
        self.money += amount;
        self.total_earnings += amount;
        Ok(())
    }

    /// Debits `cost` from the balance, failing when funds are insufficient.
    pub fn spend(&mut self, cost: f64) -> Result<(), EconomyError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(EconomyError::InvalidAmount(cost));
        }
        if cost > self.money {
            return Err(EconomyError::InsufficientFunds {
                required: cost,
                available: self.money,
            });
        }
        self.money -= cost;
        Ok(())
    }

    /// Resets balance and income for a new level, keeping the multiplier and
    /// lifetime earnings.
    pub fn restart(&mut self, starting_money: f64) {
        self.money = sanitize(starting_money);
        self.money_per_second = 0.0;
    }

    /// Replaces the passive income. Negative or non-finite values become zero.
    pub fn set_money_per_second(&mut self, value: f64) {
        self.money_per_second = sanitize(value);
    }

    /// Adds `delta` to the multiplier, keeping it strictly positive.
    pub fn raise_multiplier(&mut self, delta: f64) -> Result<(), EconomyError> {
        let next = self.multiplier + delta;
        if !next.is_finite() || next <= 0.0 {
            return Err(EconomyError::InvalidAmount(delta));
        }
        self.multiplier = next;
        Ok(())
    }

    /// Multiplies the multiplier by `factor`, keeping it strictly positive.
    pub fn scale_multiplier(&mut self, factor: f64) -> Result<(), EconomyError> {
        let next = self.multiplier * factor;
        if !next.is_finite() || next <= 0.0 {
            return Err(EconomyError::InvalidAmount(factor));
        }
        self.multiplier = next;
        Ok(())
    }
}

impl Default for EconomyState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
