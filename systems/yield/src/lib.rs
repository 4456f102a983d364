#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure yield calculation derived from loop properties.

use rail_tycoon_core::LoopResult;
use rail_tycoon_system_path::{path_length, DensePath};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_STATION_RATE: f64 = 100.0;
const DEFAULT_DISTANCE_RATE: f64 = 10.0;

/// Formula used to turn a loop into income.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldMode {
    /// `stations * base_station_rate * multiplier`.
    #[default]
    StationBased,
    /// `(stations * base_station_rate + floor(length) * distance_rate) * multiplier`.
    DistanceAugmented,
}

/// Rates applied by the [`YieldCalculator`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YieldConfig {
    /// Formula selecting which loop properties pay out.
    pub mode: YieldMode,
    /// Income per second contributed by each station.
    pub base_station_rate: f64,
    /// Income per second contributed by each whole pixel of track length.
    pub distance_rate: f64,
}

impl Default for YieldConfig {
    fn default() -> Self {
        Self {
            mode: YieldMode::StationBased,
            base_station_rate: DEFAULT_BASE_STATION_RATE,
            distance_rate: DEFAULT_DISTANCE_RATE,
        }
    }
}

/// Income derived from the current loop.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Yield {
    /// Money credited per second while the loop stays valid.
    pub money_per_second: f64,
}

/// Computes income from a loop, its dense path and the upgrade multiplier.
#[derive(Clone, Copy, Debug, Default)]
pub struct YieldCalculator {
    config: YieldConfig,
}

impl YieldCalculator {
    /// Creates a calculator using the provided rates.
    #[must_use]
    pub const fn new(config: YieldConfig) -> Self {
        Self { config }
    }

    /// Rates in use.
    #[must_use]
    pub const fn config(&self) -> &YieldConfig {
        &self.config
    }

    /// Income for `result`. Always zero when the loop is invalid.
    #[must_use]
    pub fn compute_yield(&self, result: &LoopResult, path: &DensePath, multiplier: f64) -> Yield {
        if !result.is_valid() {
            return Yield::default();
        }

        let stations = f64::from(result.station_count()) * self.config.base_station_rate;
        let base = match self.config.mode {
            YieldMode::StationBased => stations,
            YieldMode::DistanceAugmented => {
                let distance = f64::from(path_length(path)).floor();
                stations + distance * self.config.distance_rate
            }
        };

        Yield {
            money_per_second: (base * multiplier).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_tycoon_core::{CellCoord, LoopFault};

    #[test]
    fn invalid_loops_earn_nothing_in_any_mode() {
        let broken = LoopResult::broken(LoopFault::NoDeparture);
        for mode in [YieldMode::StationBased, YieldMode::DistanceAugmented] {
            let calculator = YieldCalculator::new(YieldConfig {
                mode,
                ..YieldConfig::default()
            });
            assert_eq!(
                calculator
                    .compute_yield(&broken, &DensePath::empty(), 3.0)
                    .money_per_second,
                0.0
            );
        }
    }

    #[test]
    fn station_mode_ignores_path_length() {
        let result = LoopResult::closed(
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
                CellCoord::new(0, 1),
            ],
            1,
        );
        let calculator = YieldCalculator::default();
        let income = calculator.compute_yield(&result, &DensePath::empty(), 1.5);
        assert_eq!(income.money_per_second, 150.0);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: YieldConfig =
            serde_json::from_str(r#"{"mode":"distance_augmented"}"#).expect("valid config");
        assert_eq!(config.mode, YieldMode::DistanceAugmented);
        assert_eq!(config.base_station_rate, 100.0);
        assert_eq!(config.distance_rate, 10.0);
    }
}
