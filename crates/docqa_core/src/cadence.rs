#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Fast,
    Slow,
}

/// The cadence a registry snapshot asks for, ignoring hysteresis.
pub fn desired_cadence(any_ingesting: bool) -> Cadence {
    if any_ingesting {
        Cadence::Fast
    } else {
        Cadence::Slow
    }
}

/// Chooses the refresh cadence from successive registry observations.
///
/// Speeding up is immediate. Slowing down needs `slow_down_after` consecutive
/// quiet observations, which bounds timer restarts when statuses flap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadenceControl {
    current: Cadence,
    quiet_streak: u32,
    slow_down_after: u32,
    restarts: u64,
}

impl CadenceControl {
    pub fn new(slow_down_after: u32) -> Self {
        Self {
            current: Cadence::Slow,
            quiet_streak: 0,
            slow_down_after: slow_down_after.max(1),
            restarts: 0,
        }
    }

    pub fn current(&self) -> Cadence {
        self.current
    }

    /// Number of cadence switches so far.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Feeds one observation; returns the new cadence when the timer must restart.
    pub fn observe(&mut self, any_ingesting: bool) -> Option<Cadence> {
        let wanted = desired_cadence(any_ingesting);
        if wanted == Cadence::Fast {
            self.quiet_streak = 0;
        } else {
            self.quiet_streak = self.quiet_streak.saturating_add(1);
            if self.quiet_streak < self.slow_down_after {
                return None;
            }
        }
        if wanted == self.current {
            return None;
        }
        self.current = wanted;
        self.restarts += 1;
        Some(wanted)
    }
}
