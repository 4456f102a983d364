//! Campaign level descriptions consumed by the world and the campaign system.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, TileTypeId};

/// Terrain feature that blocks tile placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Boulder occupying a single cell.
    Rock,
    /// Mountain occupying a single cell.
    Mountain,
    /// Lake occupying a single cell.
    Lake,
}

/// Obstacle pinned to a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    /// Cell blocked by the obstacle.
    pub cell: CellCoord,
    /// Kind of terrain blocking the cell.
    pub kind: ObstacleKind,
}

/// Objective a level asks the player to reach.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum LevelGoal {
    /// Hold at least the target balance.
    Money(f64),
    /// Run a valid loop passing at least the target number of stations.
    Stations(u32),
    /// Reach at least the target passive income.
    MoneyPerSecond(f64),
}

/// Prize granted once a level goal is reached.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelReward {
    /// Money credited to the player.
    #[serde(default)]
    pub money: f64,
    /// Tile types announced as unlocked.
    #[serde(default)]
    pub unlocks: Vec<TileTypeId>,
    /// Factor applied to the earnings multiplier.
    #[serde(default)]
    pub multiplier: Option<f64>,
    /// Minimum train speed granted by the reward.
    #[serde(default)]
    pub train_speed: Option<f64>,
    /// Whether completing the level opens free play.
    #[serde(default)]
    pub free_mode: bool,
}

/// Static definition of a campaign level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignLevel {
    /// One-based level number.
    pub id: u32,
    /// Display name of the level.
    pub name: String,
    /// Short objective text.
    pub description: String,
    /// Side length of the square grid.
    pub grid_size: u32,
    /// Balance the player starts the level with.
    pub starting_money: f64,
    /// Cells that cannot receive track.
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    /// Maximum number of placed tiles, excluding the depot.
    #[serde(default)]
    pub max_tiles: Option<usize>,
    /// Objective that completes the level.
    pub goal: LevelGoal,
    /// Prize granted on completion.
    pub reward: LevelReward,
}
