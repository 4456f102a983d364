#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Campaign progression system.
//!
//! Tracks the active level, evaluates its goal against the player's progress
//! and advances through the level list, granting each reward exactly once.

use rail_tycoon_core::{
    CampaignLevel, CellCoord, Command, Event, LevelGoal, LevelReward, Obstacle, ObstacleKind,
    TileTypeId,
};
use thiserror::Error;
use tracing::info;

/// Errors raised while driving the campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CampaignError {
    /// No level carries the requested identifier.
    #[error("unknown campaign level {0}")]
    UnknownLevel(u32),
    /// The campaign holds no levels.
    #[error("campaign has no levels")]
    Empty,
}

/// Player progress measured against level goals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GoalInputs {
    /// Current balance.
    pub money: f64,
    /// Stations on the current valid loop, zero when the loop is broken.
    pub station_count: u32,
    /// Current passive income.
    pub money_per_second: f64,
}

/// How far the player is from meeting a goal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalProgress {
    /// Completed share of the goal, clamped to `0.0..=1.0`.
    pub fraction: f64,
    /// Whether the goal is met.
    pub met: bool,
}

/// Measures `inputs` against `goal`.
#[must_use]
pub fn evaluate(goal: &LevelGoal, inputs: &GoalInputs) -> GoalProgress {
    let (current, target) = match *goal {
        LevelGoal::Money(target) => (inputs.money, target),
        LevelGoal::Stations(target) => (f64::from(inputs.station_count), f64::from(target)),
        LevelGoal::MoneyPerSecond(target) => (inputs.money_per_second, target),
    };

    if target <= 0.0 {
        return GoalProgress {
            fraction: 1.0,
            met: true,
        };
    }

    GoalProgress {
        fraction: (current / target).clamp(0.0, 1.0),
        met: current >= target,
    }
}

/// The five built-in levels, in play order.
#[must_use]
pub fn standard_levels() -> Vec<CampaignLevel> {
    vec![
        CampaignLevel {
            id: 1,
            name: "Primera Ruta".to_owned(),
            description: "Connect the depot to a station".to_owned(),
            grid_size: 5,
            starting_money: 200.0,
            obstacles: Vec::new(),
            max_tiles: None,
            goal: LevelGoal::Money(1_000.0),
            reward: LevelReward {
                money: 500.0,
                unlocks: unlocks(&["curve_tr", "curve_tl"]),
                ..LevelReward::default()
            },
        },
        CampaignLevel {
            id: 2,
            name: "Cruce de Caminos".to_owned(),
            description: "Build a loop through two stations".to_owned(),
            grid_size: 6,
            starting_money: 500.0,
            obstacles: vec![
                obstacle(2, 2, ObstacleKind::Rock),
                obstacle(3, 3, ObstacleKind::Rock),
            ],
            max_tiles: None,
            goal: LevelGoal::Stations(2),
            reward: LevelReward {
                money: 1_000.0,
                unlocks: unlocks(&["curve_br", "curve_bl"]),
                ..LevelReward::default()
            },
        },
        CampaignLevel {
            id: 3,
            name: "Eficiencia Máxima".to_owned(),
            description: "Earn $5,000 with at most 10 tiles".to_owned(),
            grid_size: 7,
            starting_money: 1_000.0,
            obstacles: Vec::new(),
            max_tiles: Some(10),
            goal: LevelGoal::Money(5_000.0),
            reward: LevelReward {
                money: 2_500.0,
                multiplier: Some(1.5),
                ..LevelReward::default()
            },
        },
        CampaignLevel {
            id: 4,
            name: "El Laberinto".to_owned(),
            description: "Route the track around the obstacles".to_owned(),
            grid_size: 8,
            starting_money: 2_000.0,
            obstacles: vec![
                obstacle(2, 1, ObstacleKind::Mountain),
                obstacle(3, 3, ObstacleKind::Mountain),
                obstacle(5, 2, ObstacleKind::Lake),
                obstacle(5, 5, ObstacleKind::Lake),
            ],
            max_tiles: None,
            goal: LevelGoal::Stations(4),
            reward: LevelReward {
                money: 5_000.0,
                train_speed: Some(2.0),
                ..LevelReward::default()
            },
        },
        CampaignLevel {
            id: 5,
            name: "Industrialización".to_owned(),
            description: "Grow a railway empire".to_owned(),
            grid_size: 10,
            starting_money: 5_000.0,
            obstacles: Vec::new(),
            max_tiles: None,
            goal: LevelGoal::MoneyPerSecond(100.0),
            reward: LevelReward {
                money: 10_000.0,
                free_mode: true,
                ..LevelReward::default()
            },
        },
    ]
}

fn obstacle(column: u32, row: u32, kind: ObstacleKind) -> Obstacle {
    Obstacle {
        cell: CellCoord::new(column, row),
        kind,
    }
}

fn unlocks(ids: &[&str]) -> Vec<TileTypeId> {
    ids.iter().copied().map(TileTypeId::from).collect()
}

/// Drives the player through an ordered list of levels.
#[derive(Debug)]
pub struct Campaign {
    levels: Vec<CampaignLevel>,
    current: Option<usize>,
    complete: bool,
}

impl Campaign {
    /// Creates a campaign over `levels`, kept in the provided order.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::Empty`] when `levels` is empty.
    pub fn new(levels: Vec<CampaignLevel>) -> Result<Self, CampaignError> {
        if levels.is_empty() {
            return Err(CampaignError::Empty);
        }
        Ok(Self {
            levels,
            current: None,
            complete: false,
        })
    }

    /// Campaign over [`standard_levels`].
    #[must_use]
    pub fn standard() -> Self {
        Self {
            levels: standard_levels(),
            current: None,
            complete: false,
        }
    }

    /// Levels in play order.
    #[must_use]
    pub fn levels(&self) -> &[CampaignLevel] {
        &self.levels
    }

    /// Level being played, if the campaign has started and is not complete.
    #[must_use]
    pub fn current_level(&self) -> Option<&CampaignLevel> {
        if self.complete {
            return None;
        }
        self.current.and_then(|index| self.levels.get(index))
    }

    /// Reports whether the final level has been completed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Progress on the active level's goal.
    #[must_use]
    pub fn progress(&self, inputs: &GoalInputs) -> Option<GoalProgress> {
        self.current_level()
            .map(|level| evaluate(&level.goal, inputs))
    }

    /// Jumps to `level_id` and emits the command that sets it up.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::UnknownLevel`] when no level carries `level_id`.
    pub fn start(&mut self, level_id: u32, out: &mut Vec<Command>) -> Result<(), CampaignError> {
        let index = self
            .levels
            .iter()
            .position(|level| level.id == level_id)
            .ok_or(CampaignError::UnknownLevel(level_id))?;

        self.current = Some(index);
        self.complete = false;
        out.push(Command::StartLevel {
            level: self.levels[index].clone(),
        });
        Ok(())
    }

    /// Checks the active goal after progress-affecting events.
    ///
    /// A met goal advances the campaign: the next level is started and then
    /// the completed level's reward is granted, so the reward survives the
    /// balance reset of the new level.
    pub fn handle(&mut self, events: &[Event], inputs: &GoalInputs, out: &mut Vec<Command>) {
        let relevant = events.iter().any(|event| {
            matches!(
                event,
                Event::MoneyAdded { .. }
                    | Event::OfflineEarningsCredited { .. }
                    | Event::YieldChanged { .. }
                    | Event::TrackLayoutChanged
                    | Event::TrainStateChanged { .. }
            )
        });
        if !relevant {
            return;
        }

        let Some(index) = self.current.filter(|_| !self.complete) else {
            return;
        };
        let Some(level) = self.levels.get(index) else {
            return;
        };
        if !evaluate(&level.goal, inputs).met {
            return;
        }

        let completed = level.id;
        let reward = level.reward.clone();
        info!(level_id = completed, level_name = %level.name, "level completed");

        match self.levels.get(index + 1) {
            Some(next) => {
                out.push(Command::StartLevel {
                    level: next.clone(),
                });
                self.current = Some(index + 1);
            }
            None => {
                info!("campaign complete");
                self.complete = true;
            }
        }
        out.push(Command::GrantReward {
            level: completed,
            reward,
        });
    }
}

impl Default for Campaign {
    fn default() -> Self {
        Self::standard()
    }
}
