use std::time::Duration;

use anyhow::Result;
use rail_tycoon_core::{Command, Event, LoopResult};
use rail_tycoon_system_campaign::{Campaign, GoalInputs};
use rail_tycoon_system_dispatch::{Dispatch, TrackSnapshot};
use rail_tycoon_system_idle::IdleTicker;
use rail_tycoon_system_movement::{TrainMovement, TrainView};
use rail_tycoon_system_path::DensePath;
use rail_tycoon_world::{self as world, query, World};

use crate::config::GameConfig;

/// World wired to the dispatch, movement, idle and campaign systems.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    dispatch: Dispatch,
    movement: TrainMovement,
    ticker: IdleTicker,
    campaign: Campaign,
}

impl Session {
    /// Builds a session from the loaded configuration.
    pub(crate) fn new(config: &GameConfig) -> Result<Self> {
        Ok(Self {
            world: World::with_config(config.world_config()?),
            dispatch: Dispatch::new(config.dispatch, config.yield_rates),
            movement: TrainMovement::new(),
            ticker: IdleTicker::new(config.idle),
            campaign: Campaign::standard(),
        })
    }

    /// Read-only access to the authoritative world.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Loop computed after the latest layout change.
    pub(crate) fn loop_result(&self) -> Option<&LoopResult> {
        self.dispatch.loop_result()
    }

    /// Dense path of the current loop.
    pub(crate) fn dense_path(&self) -> &DensePath {
        self.dispatch.dense_path()
    }

    /// Train position along the current loop.
    pub(crate) fn movement(&self) -> &TrainMovement {
        &self.movement
    }

    /// Campaign progression, idle until a level is started.
    pub(crate) fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Progress measured against campaign goals.
    pub(crate) fn goal_inputs(&self) -> GoalInputs {
        let economy = query::economy(&self.world);
        let station_count = self
            .dispatch
            .loop_result()
            .filter(|result| result.is_valid())
            .map_or(0, LoopResult::station_count);
        GoalInputs {
            money: economy.money(),
            station_count,
            money_per_second: economy.money_per_second(),
        }
    }

    /// Starts campaign level `level_id` on a fresh grid.
    pub(crate) fn start_level(&mut self, level_id: u32) -> Result<Vec<Event>> {
        let mut commands = Vec::new();
        self.campaign.start(level_id, &mut commands)?;
        Ok(self.submit(commands))
    }

    /// Advances simulated time by `dt`.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<Event> {
        self.submit(vec![Command::Tick { dt }])
    }

    /// Stops passive accrual as if the player closed the game.
    pub(crate) fn suspend(&mut self) {
        self.ticker.stop();
    }

    /// Resumes after `away` and credits the offline catch-up.
    ///
    /// Returns the amount credited.
    pub(crate) fn resume(&mut self, away: Duration) -> f64 {
        let money_per_second = query::economy(&self.world).money_per_second();
        let mut commands = Vec::new();
        let credited = self.ticker.resume(away, money_per_second, &mut commands);
        let _ = self.submit(commands);
        credited
    }

    /// Applies `commands` and routes the resulting events through the
    /// systems until no further commands are produced.
    pub(crate) fn submit(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut pending = commands;
        let mut history = Vec::new();

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            let economy = query::economy(&self.world);
            let snapshot = TrackSnapshot {
                grid: query::placed_grid(&self.world),
                catalog: query::catalog(&self.world),
                depot: query::depot(&self.world),
                grid_size: query::grid_size(&self.world),
                multiplier: economy.multiplier(),
            };
            self.dispatch.handle(&events, snapshot, &mut pending);

            let train = query::train(&self.world);
            let view = TrainView {
                speed: train.speed(),
                running: train.running(),
            };
            self.movement
                .handle(&events, view, self.dispatch.dense_path());
            self.ticker
                .handle(&events, economy.money_per_second(), &mut pending);

            let inputs = self.goal_inputs();
            self.campaign.handle(&events, &inputs, &mut pending);

            history.extend(events);
        }

        history
    }
}

#[cfg(test)]
mod tests {
    use rail_tycoon_core::UpgradeKind;

    use super::*;
    use crate::layout_transfer::TrackLayoutSnapshot;

    fn ring_session(stations: u32) -> Session {
        let mut session = Session::new(&GameConfig::default()).expect("default config loads");
        let ring = TrackLayoutSnapshot::perimeter_ring(4, stations);
        let _ = session.submit(ring.restore_commands());
        assert!(query::train(session.world()).running());
        session
    }

    #[test]
    fn speed_upgrades_move_the_train_faster() {
        let mut session = ring_session(2);
        let _ = session.advance(Duration::from_millis(500));
        assert_eq!(session.movement().progress(), 0.5);

        let _ = session.submit(vec![Command::PurchaseUpgrade {
            kind: UpgradeKind::TrainSpeed,
        }]);
        let _ = session.advance(Duration::from_millis(500));

        assert_eq!(session.movement().laps(), 1);
        assert_eq!(session.movement().progress(), 0.25);
        assert!(session.movement().position().is_some());
    }

    #[test]
    fn resuming_after_a_suspend_credits_offline_earnings_once() {
        let mut session = ring_session(2);
        assert_eq!(query::economy(session.world()).money_per_second(), 200.0);
        let before = query::economy(session.world()).money();

        session.suspend();
        let _ = session.advance(Duration::from_secs(5));
        assert_eq!(query::economy(session.world()).money(), before);

        let credited = session.resume(Duration::from_secs(120));
        assert_eq!(credited, 12_000.0);
        assert_eq!(query::economy(session.world()).money(), before + 12_000.0);
        assert_eq!(session.resume(Duration::from_secs(120)), 0.0);
    }

    #[test]
    fn meeting_a_level_goal_advances_the_campaign() {
        let mut session = Session::new(&GameConfig::default()).expect("default config loads");
        let _ = session.start_level(1).expect("level one exists");
        assert_eq!(query::grid_size(session.world()), 5);
        assert_eq!(query::economy(session.world()).money(), 200.0);

        let events = session.submit(vec![Command::AddMoney { amount: 1_000.0 }]);

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::LevelStarted { level: 2 })));
        let current = session.campaign().current_level().map(|level| level.id);
        assert_eq!(current, Some(2));
        assert_eq!(query::economy(session.world()).money(), 1_000.0);
    }

    #[test]
    fn unknown_levels_fail_to_start() {
        let mut session = Session::new(&GameConfig::default()).expect("default config loads");
        assert!(session.start_level(99).is_err());
        assert!(session.campaign().current_level().is_none());
    }
}
