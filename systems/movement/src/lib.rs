#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Train movement system that advances the train along the dense loop path.
//!
//! Progress is the share of one lap completed, in `0.0..1.0`. A train with
//! speed `s` covers `s` laps per simulated second, whatever the loop length.

use glam::Vec2;
use rail_tycoon_core::Event;
use rail_tycoon_system_path::DensePath;
use tracing::trace;

/// Speed and running state the movement system reads from the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainView {
    /// Laps covered per simulated second.
    pub speed: f64,
    /// Whether the train runs along a valid loop.
    pub running: bool,
}

/// Pure system that moves the train in response to elapsed time.
#[derive(Debug)]
pub struct TrainMovement {
    progress: f64,
    laps: u64,
    position: Option<Vec2>,
    path_index: usize,
}

impl TrainMovement {
    /// Creates a train parked at the start of the loop.
    #[must_use]
    pub fn new() -> Self {
        Self {
            progress: 0.0,
            laps: 0,
            position: None,
            path_index: 0,
        }
    }

    /// Completed share of the current lap.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Laps completed since the loop was last rebuilt.
    #[must_use]
    pub const fn laps(&self) -> u64 {
        self.laps
    }

    /// Pixel position of the train, `None` while the path is too short to ride.
    #[must_use]
    pub const fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Index of the dense path point the train last passed.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Consumes world events and advances the train along `path`.
    ///
    /// A layout change sends the train back to the start of the loop. Elapsed
    /// time moves it only while it runs on a path of at least two points.
    pub fn handle(&mut self, events: &[Event], train: TrainView, path: &DensePath) {
        for event in events {
            match event {
                Event::TrackLayoutChanged => self.reset(),
                Event::TimeAdvanced { dt } => {
                    if train.running && path.len() >= 2 {
                        self.advance(train.speed * dt.as_secs_f64());
                    }
                }
                _ => {}
            }
        }

        self.locate(path);
    }

    fn reset(&mut self) {
        self.progress = 0.0;
        self.laps = 0;
    }

    fn advance(&mut self, laps: f64) {
        if !laps.is_finite() || laps <= 0.0 {
            return;
        }

        let travelled = self.progress + laps;
        let whole = travelled.floor();
        if whole >= 1.0 {
            self.laps = self.laps.saturating_add(whole as u64);
            trace!(laps = self.laps, "train completed a lap");
        }
        self.progress = (travelled - whole).clamp(0.0, 1.0 - f64::EPSILON);
    }

    fn locate(&mut self, path: &DensePath) {
        let points = path.points();
        if points.len() < 2 {
            self.position = None;
            self.path_index = 0;
            return;
        }

        let span = self.progress * (points.len() - 1) as f64;
        let index = (span.floor() as usize).min(points.len() - 2);
        let local = (span - index as f64) as f32;

        self.path_index = index;
        self.position = Some(points[index].lerp(points[index + 1], local));
    }
}

impl Default for TrainMovement {
    fn default() -> Self {
        Self::new()
    }
}
