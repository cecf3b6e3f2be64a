#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure timing system that converts minigame completion time into points.

use std::time::Duration;

use loaf_core::GameKind;

/// Highest score a minigame can award.
pub const MAX_SCORE: u32 = 3;

/// Stopwatch bound to a single minigame kind.
#[derive(Clone, Debug)]
pub struct ScoreTimer {
    kind: GameKind,
    elapsed: Duration,
    running: bool,
    last_score: Option<u32>,
}

impl ScoreTimer {
    /// Creates a running timer for the provided minigame.
    #[must_use]
    pub const fn new(kind: GameKind) -> Self {
        Self {
            kind,
            elapsed: Duration::ZERO,
            running: true,
            last_score: None,
        }
    }

    /// Minigame the timer scores.
    #[must_use]
    pub const fn kind(&self) -> GameKind {
        self.kind
    }

    /// Stops accumulating time without scoring.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Adds frame time while the timer runs.
    pub fn advance(&mut self, dt: Duration) {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(dt);
        }
    }

    /// Whether the timer currently accumulates time.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Time accumulated so far.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Score produced by the most recent [`Self::finish`] call.
    #[must_use]
    pub const fn last_score(&self) -> Option<u32> {
        self.last_score
    }

    /// Stops the timer and scores the elapsed time against the minigame limits.
    pub fn finish(&mut self) -> u32 {
        self.running = false;
        let score = score_for(self.kind, self.elapsed);
        self.last_score = Some(score);
        score
    }
}

/// Points earned for finishing `kind` after `elapsed`.
///
/// Each limit is inclusive: finishing exactly on a limit still earns its tier.
#[must_use]
pub fn score_for(kind: GameKind, elapsed: Duration) -> u32 {
    let seconds = elapsed.as_secs_f32();
    let tiers = kind.time_limits();
    let beaten = tiers.iter().filter(|limit| seconds <= **limit).count();
    u32::try_from(beaten).unwrap_or(MAX_SCORE).min(MAX_SCORE)
}
