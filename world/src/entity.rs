//! Pieces shared by the player and the enemies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of frames in every walk cycle.
pub(crate) const WALK_FRAMES: u8 = 3;

/// Three-frame walk animation advanced on a fixed tick period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WalkCycle {
    frame: u8,
    counter: u32,
    period: u32,
}

impl WalkCycle {
    /// Creates a cycle that advances one frame every `period` moving ticks.
    pub(crate) const fn new(period: u32) -> Self {
        Self {
            frame: 0,
            counter: 0,
            period,
        }
    }

    /// Advances the cycle while moving and rewinds it to the first frame otherwise.
    pub(crate) fn advance(&mut self, moving: bool) {
        if !moving {
            self.frame = 0;
            return;
        }

        self.counter += 1;
        if self.counter >= self.period {
            self.frame = (self.frame + 1) % WALK_FRAMES;
            self.counter = 0;
        }
    }

    /// Frame currently shown.
    pub(crate) const fn frame(&self) -> u8 {
        self.frame
    }
}

/// Center of a footprint whose top-left corner sits at `position`.
pub(crate) fn center(position: Vec2, size: Vec2) -> Vec2 {
    position + size * 0.5
}

#[cfg(test)]
mod tests {
    use super::WalkCycle;

    #[test]
    fn frame_advances_once_per_period() {
        let mut cycle = WalkCycle::new(6);
        for _ in 0..5 {
            cycle.advance(true);
        }
        assert_eq!(cycle.frame(), 0);

        cycle.advance(true);
        assert_eq!(cycle.frame(), 1);

        for _ in 0..12 {
            cycle.advance(true);
        }
        assert_eq!(cycle.frame(), 0);
    }

    #[test]
    fn standing_still_rewinds_the_cycle() {
        let mut cycle = WalkCycle::new(1);
        cycle.advance(true);
        assert_eq!(cycle.frame(), 1);

        cycle.advance(false);
        assert_eq!(cycle.frame(), 0);
    }
}
