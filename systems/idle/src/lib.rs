#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Idle income system that accrues yield on a fixed cadence.

use std::time::Duration;

use rail_tycoon_core::{Command, Event};
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_OFFLINE_CAP: Duration = Duration::from_secs(86_400);
const DEFAULT_OFFLINE_EFFICIENCY: f64 = 0.5;

/// Cadence and offline catch-up parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Interval between two accruals.
    #[serde(with = "millis")]
    pub tick_interval: Duration,
    /// Longest absence credited by offline catch-up.
    #[serde(with = "seconds")]
    pub offline_cap: Duration,
    /// Fraction of the live rate paid for offline time.
    pub offline_efficiency: f64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            offline_cap: DEFAULT_OFFLINE_CAP,
            offline_efficiency: DEFAULT_OFFLINE_EFFICIENCY,
        }
    }
}

/// Earnings for `seconds_away` of absence at `money_per_second`.
///
/// The absence is clamped to the configured cap before the offline
/// efficiency is applied. Negative or non-finite inputs earn nothing.
#[must_use]
pub fn compute_offline_earnings(
    seconds_away: f64,
    money_per_second: f64,
    config: &IdleConfig,
) -> f64 {
    if !seconds_away.is_finite() || !money_per_second.is_finite() {
        return 0.0;
    }
    let capped = seconds_away.clamp(0.0, config.offline_cap.as_secs_f64());
    (capped * money_per_second.max(0.0) * config.offline_efficiency).max(0.0)
}

/// Accrues passive income while the session is active.
///
/// Each full tick interval of simulated time produces exactly one
/// [`Command::AddMoney`]. Stopping the ticker discards the partial interval
/// and suppresses all accrual until [`IdleTicker::resume`] is called.
#[derive(Debug)]
pub struct IdleTicker {
    config: IdleConfig,
    accumulator: Duration,
    running: bool,
}

impl IdleTicker {
    /// Creates a running ticker.
    #[must_use]
    pub fn new(config: IdleConfig) -> Self {
        Self {
            config,
            accumulator: Duration::ZERO,
            running: true,
        }
    }

    /// Reports whether the ticker accrues income.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Halts accrual until the next [`IdleTicker::resume`].
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = Duration::ZERO;
    }

    /// Restarts a stopped ticker and credits the time spent away.
    ///
    /// Offline earnings are computed from `elapsed` wall-clock time, once per
    /// stop/resume pair. Resuming a running ticker does nothing and returns
    /// zero. The caller decides eligibility by passing a zero rate.
    pub fn resume(
        &mut self,
        elapsed: Duration,
        money_per_second: f64,
        out: &mut Vec<Command>,
    ) -> f64 {
        if self.running {
            return 0.0;
        }

        self.running = true;
        self.accumulator = Duration::ZERO;

        let away = elapsed.min(self.config.offline_cap);
        let amount =
            compute_offline_earnings(elapsed.as_secs_f64(), money_per_second, &self.config);
        if amount > 0.0 {
            info!(away_secs = away.as_secs_f64(), amount, "crediting offline earnings");
            out.push(Command::CreditOfflineEarnings { away, amount });
        }
        amount
    }

    /// Consumes clock events and emits one accrual per elapsed interval.
    pub fn handle(&mut self, events: &[Event], money_per_second: f64, out: &mut Vec<Command>) {
        if !self.running || self.config.tick_interval.is_zero() {
            return;
        }

        let interval = self.config.tick_interval;
        let amount = money_per_second * interval.as_secs_f64();

        for event in events {
            let Event::TimeAdvanced { dt } = event else {
                continue;
            };
            self.accumulator = self.accumulator.saturating_add(*dt);

            while self.accumulator >= interval {
                self.accumulator -= interval;
                if amount > 0.0 && amount.is_finite() {
                    out.push(Command::AddMoney { amount });
                }
            }
        }
    }
}

impl Default for IdleTicker {
    fn default() -> Self {
        Self::new(IdleConfig::default())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_earnings_apply_efficiency() {
        let config = IdleConfig::default();
        assert_eq!(compute_offline_earnings(120.0, 10.0, &config), 600.0);
    }

    #[test]
    fn offline_earnings_are_capped_at_one_day() {
        let config = IdleConfig::default();
        assert_eq!(compute_offline_earnings(200_000.0, 10.0, &config), 432_000.0);
    }

    #[test]
    fn negative_inputs_earn_nothing() {
        let config = IdleConfig::default();
        assert_eq!(compute_offline_earnings(-5.0, 10.0, &config), 0.0);
        assert_eq!(compute_offline_earnings(5.0, -10.0, &config), 0.0);
        assert_eq!(compute_offline_earnings(f64::NAN, 10.0, &config), 0.0);
    }

    #[test]
    fn stop_discards_partial_interval() {
        let mut ticker = IdleTicker::default();
        let mut commands = Vec::new();
        ticker.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(900),
            }],
            5.0,
            &mut commands,
        );
        assert!(commands.is_empty());

        ticker.stop();
        let _ = ticker.resume(Duration::ZERO, 5.0, &mut commands);
        ticker.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(200),
            }],
            5.0,
            &mut commands,
        );
        assert!(commands.is_empty(), "partial interval must not survive a stop");
    }
}
