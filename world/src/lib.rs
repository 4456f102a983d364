#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Rail Tycoon.

mod placement;

use rail_tycoon_core::{
    CampaignLevel, CellCoord, Command, EconomyState, Event, LevelReward, PlacedGrid,
    PlacementError, TileCatalog, TileTypeId, UpgradeKind, DEPOT_CELL, WELCOME_BANNER,
};
use tracing::debug;

use placement::LevelConstraints;

/// Grid edge length used when no other size is configured.
pub const DEFAULT_GRID_SIZE: u32 = 8;
const MIN_GRID_SIZE: u32 = 2;
/// Balance a new world starts with.
pub const DEFAULT_STARTING_MONEY: f64 = 500.0;

const TRAIN_SPEED_STEP: f64 = 0.5;
const MULTIPLIER_STEP: f64 = 0.5;

/// Parameters used to build a fresh world.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Side length of the square grid.
    pub grid_size: u32,
    /// Balance the player starts with.
    pub starting_money: f64,
    /// Tile types available for placement.
    pub catalog: TileCatalog,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            starting_money: DEFAULT_STARTING_MONEY,
            catalog: TileCatalog::standard(),
        }
    }
}

/// Speed and running state of the train.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainState {
    speed: f64,
    level: u32,
    running: bool,
}

impl TrainState {
    fn new() -> Self {
        Self {
            speed: 1.0,
            level: 1,
            running: false,
        }
    }

    /// Movement speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Number of speed upgrades bought, starting at one.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Whether the train currently runs along a valid loop.
    #[must_use]
    pub const fn running(&self) -> bool {
        self.running
    }
}

/// Represents the authoritative Rail Tycoon world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid_size: u32,
    depot: CellCoord,
    catalog: TileCatalog,
    grid: PlacedGrid,
    economy: EconomyState,
    train: TrainState,
    constraints: LevelConstraints,
    tick_index: u64,
}

impl World {
    /// Creates a new world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a new world from the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            grid_size: config.grid_size.max(MIN_GRID_SIZE),
            depot: DEPOT_CELL,
            catalog: config.catalog,
            grid: PlacedGrid::new(),
            economy: EconomyState::new(config.starting_money),
            train: TrainState::new(),
            constraints: LevelConstraints::default(),
            tick_index: 0,
        };
        world.reset_grid();
        world
    }

    fn reset_grid(&mut self) {
        self.grid = PlacedGrid::new();
        let depot_id = self.catalog.depot_id().clone();
        let _ = self.grid.insert(self.depot, depot_id);
    }

    fn place(&mut self, cell: CellCoord, tile: TileTypeId, out_events: &mut Vec<Event>) {
        match placement::check_purchase(self, cell, &tile) {
            Ok(cost) => {
                if let Err(error) = self.economy.spend(cost) {
                    debug!(?cell, %tile, %error, "tile purchase failed");
                    let reason = PlacementError::InsufficientFunds {
                        required: cost,
                        available: self.economy.money(),
                    };
                    out_events.push(Event::TilePlacementRejected { cell, tile, reason });
                    return;
                }
                let _ = self.grid.insert(cell, tile.clone());
                out_events.push(Event::TilePlaced { cell, tile, cost });
                out_events.push(Event::TrackLayoutChanged);
            }
            Err(reason) => {
                debug!(?cell, %tile, ?reason, "tile placement rejected");
                out_events.push(Event::TilePlacementRejected { cell, tile, reason });
            }
        }
    }

    fn remove(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if let Err(reason) = placement::check_removal(self, cell) {
            debug!(?cell, ?reason, "tile removal rejected");
            out_events.push(Event::TileRemovalRejected { cell, reason });
            return;
        }

        if let Some(tile) = self.grid.remove(cell) {
            out_events.push(Event::TileRemoved { cell, tile });
            out_events.push(Event::TrackLayoutChanged);
        }
    }

    fn restore(&mut self, tiles: Vec<(CellCoord, TileTypeId)>, out_events: &mut Vec<Event>) {
        let mut changed = false;
        for (cell, tile) in tiles {
            match placement::check_structure(self, cell, &tile) {
                Ok(_) => {
                    let _ = self.grid.insert(cell, tile);
                    changed = true;
                }
                Err(reason) => {
                    debug!(?cell, %tile, ?reason, "restored tile skipped");
                    out_events.push(Event::TilePlacementRejected { cell, tile, reason });
                }
            }
        }

        if changed {
            out_events.push(Event::TrackLayoutChanged);
        }
    }

    fn purchase(&mut self, kind: UpgradeKind, out_events: &mut Vec<Event>) {
        let cost = kind.cost(self.train.level, self.economy.multiplier());
        if let Err(reason) = self.economy.spend(cost) {
            debug!(?kind, %reason, "upgrade rejected");
            out_events.push(Event::UpgradeRejected { kind, reason });
            return;
        }

        match kind {
            UpgradeKind::TrainSpeed => {
                self.train.speed += TRAIN_SPEED_STEP;
                self.train.level = self.train.level.saturating_add(1);
                out_events.push(Event::UpgradePurchased { kind, cost });
            }
            UpgradeKind::Multiplier => {
                if let Err(reason) = self.economy.raise_multiplier(MULTIPLIER_STEP) {
                    out_events.push(Event::UpgradeRejected { kind, reason });
                    return;
                }
                out_events.push(Event::UpgradePurchased { kind, cost });
                out_events.push(Event::MultiplierChanged {
                    multiplier: self.economy.multiplier(),
                });
            }
        }
    }

    fn start_level(&mut self, level: CampaignLevel, out_events: &mut Vec<Event>) {
        self.grid_size = level.grid_size.max(MIN_GRID_SIZE);
        self.reset_grid();
        self.constraints.clear();
        self.constraints.obstacles = level
            .obstacles
            .iter()
            .map(|obstacle| obstacle.cell)
            .filter(|cell| *cell != self.depot)
            .collect();
        self.constraints.max_tiles = level.max_tiles;
        self.economy.restart(level.starting_money);

        out_events.push(Event::LevelStarted { level: level.id });
        if self.train.running {
            self.train.running = false;
            out_events.push(Event::TrainStateChanged { running: false });
        }
        out_events.push(Event::GridConfigured {
            size: self.grid_size,
        });
        out_events.push(Event::TrackLayoutChanged);
    }

    fn grant_reward(&mut self, level: u32, reward: LevelReward, out_events: &mut Vec<Event>) {
        if reward.money > 0.0 {
            if let Err(error) = self.economy.add_money(reward.money) {
                debug!(level_id = level, %error, "reward money rejected");
            }
        }

        if let Some(speed) = reward.train_speed {
            if speed.is_finite() {
                self.train.speed = self.train.speed.max(speed);
            }
        }

        let mut multiplier_changed = false;
        if let Some(factor) = reward.multiplier {
            match self.economy.scale_multiplier(factor) {
                Ok(()) => multiplier_changed = true,
                Err(error) => debug!(level_id = level, %error, "reward multiplier rejected"),
            }
        }

        out_events.push(Event::RewardGranted { level, reward });
        if multiplier_changed {
            out_events.push(Event::MultiplierChanged {
                multiplier: self.economy.multiplier(),
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { size } => {
            world.grid_size = size.max(MIN_GRID_SIZE);
            world.reset_grid();
            world.constraints.clear();
            out_events.push(Event::GridConfigured {
                size: world.grid_size,
            });
            out_events.push(Event::TrackLayoutChanged);
        }
        Command::PlaceTile { cell, tile } => world.place(cell, tile, out_events),
        Command::RemoveTile { cell } => world.remove(cell, out_events),
        Command::RestoreLayout { tiles } => world.restore(tiles, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::AddMoney { amount } => match world.economy.add_money(amount) {
            Ok(()) => out_events.push(Event::MoneyAdded {
                amount,
                balance: world.economy.money(),
            }),
            Err(error) => debug!(%error, "money credit rejected"),
        },
        Command::SetYield { money_per_second } => {
            let previous = world.economy.money_per_second();
            world.economy.set_money_per_second(money_per_second);
            let current = world.economy.money_per_second();
            if current != previous {
                out_events.push(Event::YieldChanged {
                    money_per_second: current,
                });
            }
        }
        Command::SetTrainRunning { running } => {
            if world.train.running != running {
                world.train.running = running;
                out_events.push(Event::TrainStateChanged { running });
            }
        }
        Command::PurchaseUpgrade { kind } => world.purchase(kind, out_events),
        Command::CreditOfflineEarnings { away, amount } => {
            match world.economy.add_money(amount) {
                Ok(()) => out_events.push(Event::OfflineEarningsCredited { amount }),
                Err(error) => debug!(?away, %error, "offline credit rejected"),
            }
        }
        Command::StartLevel { level } => world.start_level(level, out_events),
        Command::GrantReward { level, reward } => world.grant_reward(level, reward, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use rail_tycoon_core::{
        CellCoord, EconomyState, PlacedGrid, TileCatalog, TileTypeId, UpgradeKind,
    };

    use super::{TrainState, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Side length of the square grid.
    #[must_use]
    pub fn grid_size(world: &World) -> u32 {
        world.grid_size
    }

    /// Cell hosting the depot.
    #[must_use]
    pub fn depot(world: &World) -> CellCoord {
        world.depot
    }

    /// Read-only snapshot of the placed tiles, depot included.
    #[must_use]
    pub fn placed_grid(world: &World) -> &PlacedGrid {
        &world.grid
    }

    /// Tile type placed at `cell`, if any.
    #[must_use]
    pub fn tile_at(world: &World, cell: CellCoord) -> Option<&TileTypeId> {
        world.grid.tile_at(cell)
    }

    /// Number of placed tiles other than the depot.
    #[must_use]
    pub fn placed_tile_count(world: &World) -> usize {
        world.grid.occupied_excluding(world.depot)
    }

    /// Tile catalog used for placement and validation.
    #[must_use]
    pub fn catalog(world: &World) -> &TileCatalog {
        &world.catalog
    }

    /// Copy of the current economy.
    #[must_use]
    pub fn economy(world: &World) -> EconomyState {
        world.economy
    }

    /// Current train state.
    #[must_use]
    pub fn train(world: &World) -> TrainState {
        world.train
    }

    /// Cells blocked by campaign obstacles, in column-major order.
    #[must_use]
    pub fn obstacles(world: &World) -> Vec<CellCoord> {
        world.constraints.obstacles.iter().copied().collect()
    }

    /// Maximum number of placed tiles allowed by the current level.
    #[must_use]
    pub fn tile_limit(world: &World) -> Option<usize> {
        world.constraints.max_tiles
    }

    /// Price of the next purchase of `kind`.
    #[must_use]
    pub fn upgrade_cost(world: &World, kind: UpgradeKind) -> f64 {
        kind.cost(world.train.level, world.economy.multiplier())
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
