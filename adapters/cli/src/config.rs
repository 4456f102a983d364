use std::{fs, path::Path};

use anyhow::{Context, Result};
use rail_tycoon_core::{TileCatalog, TileType};
use rail_tycoon_system_dispatch::DispatchConfig;
use rail_tycoon_system_idle::IdleConfig;
use rail_tycoon_system_yield::YieldConfig;
use rail_tycoon_world::{WorldConfig, DEFAULT_GRID_SIZE, DEFAULT_STARTING_MONEY};
use serde::Deserialize;
use tracing::info;

/// Tunables loaded from the optional TOML configuration file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    /// Grid and balance defaults for new worlds.
    pub(crate) world: WorldSettings,
    /// Pixel geometry used when densifying loops.
    pub(crate) dispatch: DispatchConfig,
    /// Income rates.
    #[serde(rename = "yield")]
    pub(crate) yield_rates: YieldConfig,
    /// Accrual cadence and offline catch-up.
    pub(crate) idle: IdleConfig,
    /// Replacement tile catalog; the standard catalog is used when absent.
    pub(crate) tiles: Option<Vec<TileType>>,
}

/// World defaults that can be overridden from the configuration file.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldSettings {
    /// Side length of the square grid.
    pub(crate) grid_size: u32,
    /// Balance the player starts with.
    pub(crate) starting_money: f64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            starting_money: DEFAULT_STARTING_MONEY,
        }
    }
}

impl GameConfig {
    /// Loads the configuration at `path`, falling back to defaults when no
    /// path is given or the file does not exist.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            info!(path = %path.display(), "configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Parses configuration from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml contents")
    }

    /// Builds the world configuration, validating any custom catalog.
    pub(crate) fn world_config(&self) -> Result<WorldConfig> {
        let catalog = match &self.tiles {
            Some(types) => TileCatalog::new(types.clone()).context("invalid tile catalog")?,
            None => TileCatalog::standard(),
        };

        Ok(WorldConfig {
            grid_size: self.world.grid_size,
            starting_money: self.world.starting_money,
            catalog,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_tycoon_system_yield::YieldMode;

    #[test]
    fn empty_file_yields_defaults() {
        let config = GameConfig::parse("").expect("empty config parses");
        assert_eq!(config.world.grid_size, DEFAULT_GRID_SIZE);
        assert_eq!(config.dispatch.tile_pixel_size, 64.0);
        assert_eq!(config.yield_rates, YieldConfig::default());
        assert!(config.tiles.is_none());
    }

    #[test]
    fn sections_override_individual_fields() {
        let config = GameConfig::parse(
            r#"
            [world]
            grid_size = 12

            [yield]
            mode = "distance_augmented"

            [idle]
            offline_efficiency = 0.75
            "#,
        )
        .expect("config parses");

        assert_eq!(config.world.grid_size, 12);
        assert_eq!(config.world.starting_money, DEFAULT_STARTING_MONEY);
        assert_eq!(config.yield_rates.mode, YieldMode::DistanceAugmented);
        assert_eq!(config.idle.offline_efficiency, 0.75);
    }

    #[test]
    fn custom_catalog_without_depot_is_rejected() {
        let config = GameConfig::parse(
            r#"
            [[tiles]]
            id = "straight_h"
            name = "Horizontal"
            connections = ["left", "right"]
            cost = 50.0
            "#,
        )
        .expect("config parses");

        assert!(config.world_config().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = GameConfig::load(Some(Path::new("does/not/exist.toml")))
            .expect("missing file is not an error");
        assert_eq!(config.world.grid_size, DEFAULT_GRID_SIZE);
    }
}
