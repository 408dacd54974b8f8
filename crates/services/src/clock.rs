// Path: crates/services/src/clock.rs
//! The reward cycle clock: pure block-height arithmetic, anchored at the
//! engine's activation height. No state, no I/O.

/// Converts between block heights and reward cycle indices.
#[derive(Debug, Clone, Copy)]
pub struct RewardClock {
    /// The height the engine activated at. Cycle 0 starts here.
    pub activation_height: u64,
    /// Length of one reward cycle, in blocks.
    pub cycle_length: u64,
}

impl RewardClock {
    /// The reward cycle containing `height`, or `None` before activation.
    pub fn reward_cycle(&self, height: u64) -> Option<u64> {
        if height < self.activation_height || self.cycle_length == 0 {
            return None;
        }
        Some((height - self.activation_height) / self.cycle_length)
    }

    /// The first block height belonging to `cycle`.
    pub fn first_block_in_cycle(&self, cycle: u64) -> u64 {
        self.activation_height + cycle * self.cycle_length
    }

    /// Whether every block of `cycle` lies strictly below `height`.
    pub fn cycle_fully_elapsed(&self, cycle: u64, height: u64) -> bool {
        match self.reward_cycle(height) {
            Some(current) => current > cycle,
            None => false,
        }
    }
}
